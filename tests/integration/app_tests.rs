use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::error::ExitCode;
use dupsweep::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dupsweep", "--quiet", "--no-progress"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

fn reports_in(dir: &Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect()
}

#[test]
fn test_dry_run_reports_and_deletes_nothing() {
    let tree = tempdir().unwrap();
    let reports = tempdir().unwrap();
    fs::write(tree.path().join("a.txt"), b"hello").unwrap();
    fs::write(tree.path().join("b.txt"), b"hello").unwrap();

    let code = run_app(cli(&[
        "--report-dir",
        reports.path().to_str().unwrap(),
        tree.path().to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(tree.path().join("b.txt").exists());
    assert_eq!(reports_in(reports.path()).len(), 1);
}

#[test]
fn test_delete_permanent_removes_duplicates() {
    let tree = tempdir().unwrap();
    fs::write(tree.path().join("a.txt"), b"hello").unwrap();
    fs::write(tree.path().join("b.txt"), b"hello").unwrap();

    let code = run_app(cli(&[
        "--no-report",
        "--delete",
        "--permanent",
        tree.path().to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(tree.path().join("a.txt").exists());
    assert!(!tree.path().join("b.txt").exists());
}

#[test]
fn test_no_duplicates_exit_code() {
    let tree = tempdir().unwrap();
    fs::write(tree.path().join("only"), b"alone").unwrap();

    let code = run_app(cli(&["--no-report", tree.path().to_str().unwrap()])).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_not_a_directory_is_general_error() {
    let tree = tempdir().unwrap();
    let file = tree.path().join("file");
    fs::write(&file, b"x").unwrap();

    let err = run_app(cli(&["--no-report", file.to_str().unwrap()])).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{:#}", err).contains("Not a directory"));
}

#[test]
fn test_zero_hash_batch_rejected() {
    let tree = tempdir().unwrap();
    let result = run_app(cli(&[
        "--no-report",
        "--hash-batch",
        "0",
        tree.path().to_str().unwrap(),
    ]));
    assert!(result.is_err());
}
