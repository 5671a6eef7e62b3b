use dupsweep::duplicates::DuplicateFinder;
use dupsweep::error::ExitCode;
use dupsweep::output::json::{JsonReport, REPORT_PREFIX};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_report_round_trips_through_disk() {
    let tree = tempdir().unwrap();
    fs::write(tree.path().join("a.txt"), b"hello").unwrap();
    fs::write(tree.path().join("b.txt"), b"hello").unwrap();

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(tree.path())
        .unwrap();

    let out = tempdir().unwrap();
    let report = JsonReport::new(tree.path(), &outcome, ExitCode::Success);
    let path = report.write_report(out.path()).unwrap();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(REPORT_PREFIX));
    // dupsweep-report-YYYYMMDD-HHMMSS.json
    assert_eq!(name.len(), REPORT_PREFIX.len() + 1 + 15 + 5);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let keeper = value["groups"][0]["keeper"].as_str().unwrap();
    assert!(keeper.ends_with("a.txt"));
    assert_eq!(value["plan"]["entries"].as_array().unwrap().len(), 1);
    assert_eq!(value["summary"]["exit_code"], 0);
}
