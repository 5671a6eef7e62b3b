use dupsweep::actions::{execute_plan, DeleteConfig, DeleteError, Deleter, FsDeleter};
use dupsweep::duplicates::DuplicateFinder;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_executing_plan_keeps_one_copy_per_group() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "sub/c.txt", b"hello");
    write(dir.path(), "x.dat", b"other data");
    write(dir.path(), "y.dat", b"other data");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let result = execute_plan(
        &outcome.plan,
        &FsDeleter::new(DeleteConfig::permanent()),
        None,
    );

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.bytes_freed, outcome.plan.total_reclaimable_bytes);

    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("sub/c.txt").exists());
    assert!(dir.path().join("x.dat").exists());
    assert!(!dir.path().join("y.dat").exists());

    let rescan = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert!(rescan.groups.is_empty());
}

#[test]
fn test_vanished_planned_file_is_reported_not_fatal() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup!");
    write(dir.path(), "b", b"dup!");
    write(dir.path(), "c", b"dup!");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    fs::remove_file(dir.path().join("b")).unwrap();

    let result = execute_plan(
        &outcome.plan,
        &FsDeleter::new(DeleteConfig::permanent()),
        None,
    );

    assert_eq!(result.failure_count(), 1);
    assert!(result.failures[0].0.ends_with("b"));
    assert_eq!(result.success_count(), 1);
    assert!(!dir.path().join("c").exists());
    assert!(dir.path().join("a").exists());
}

#[test]
fn test_file_changed_after_scan_is_kept() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    fs::write(dir.path().join("b"), b"grown since scan").unwrap();

    let deleter = FsDeleter::new(DeleteConfig::permanent());
    let entry = &outcome.plan.entries[0];
    let err = deleter.delete(&entry.path, entry.size).unwrap_err();

    assert!(matches!(err, DeleteError::Modified { .. }));
    assert!(dir.path().join("b").exists());
}

#[cfg(unix)]
mod followed_links {
    use clap::Parser;
    use dupsweep::actions::{execute_plan, validate_plan, DeleteConfig, FsDeleter};
    use dupsweep::cli::Cli;
    use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
    use dupsweep::error::ExitCode;
    use dupsweep::run_app;
    use dupsweep::scanner::WalkerConfig;
    use std::fs;
    use std::os::unix::fs::symlink;
    use std::path::Path;
    use tempfile::tempdir;

    fn following() -> DuplicateFinder {
        let walker = WalkerConfig::default().with_follow_symlinks(true);
        DuplicateFinder::new(FinderConfig::default().with_walker_config(walker))
    }

    /// Delete the plan, then check every group still has a readable copy.
    fn delete_and_check_survivors(root: &Path) {
        let outcome = following().find_duplicates(root).unwrap();
        validate_plan(&outcome.plan, &outcome.groups).unwrap();
        let result = execute_plan(
            &outcome.plan,
            &FsDeleter::new(DeleteConfig::permanent()),
            None,
        );
        assert!(result.all_succeeded());

        for group in &outcome.groups {
            let survivors: Vec<_> = group
                .files()
                .iter()
                .filter(|p| fs::read(p).is_ok_and(|bytes| bytes.len() as u64 == group.size))
                .collect();
            assert!(!survivors.is_empty(), "group lost every copy: {:?}", group.files());
        }
    }

    #[test]
    fn test_link_to_only_copy_is_not_a_duplicate() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("z_real.txt"), b"only copy").unwrap();
        symlink(dir.path().join("z_real.txt"), dir.path().join("a_link.txt")).unwrap();

        let outcome = following().find_duplicates(dir.path()).unwrap();

        assert!(outcome.groups.is_empty());
        assert!(outcome.plan.is_empty());
    }

    #[test]
    fn test_linked_directory_is_not_a_duplicate() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("b_dir")).unwrap();
        fs::write(dir.path().join("b_dir").join("f.txt"), b"only copy").unwrap();
        symlink(dir.path().join("b_dir"), dir.path().join("a_dir")).unwrap();

        let outcome = following().find_duplicates(dir.path()).unwrap();

        assert!(outcome.groups.is_empty());
        assert!(outcome.plan.is_empty());
    }

    #[test]
    fn test_linked_keeper_still_resolves_after_deletion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("z_real.txt"), b"shared").unwrap();
        fs::write(dir.path().join("m_copy.txt"), b"shared").unwrap();
        symlink(dir.path().join("z_real.txt"), dir.path().join("a_link.txt")).unwrap();

        delete_and_check_survivors(dir.path());

        assert!(dir.path().join("z_real.txt").exists());
        assert_eq!(fs::read(dir.path().join("a_link.txt")).unwrap(), b"shared");
        assert!(!dir.path().join("m_copy.txt").exists());
    }

    #[test]
    fn test_file_under_linked_directory_survives_deletion() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("b_dir")).unwrap();
        fs::write(dir.path().join("b_dir").join("f.txt"), b"shared").unwrap();
        fs::write(dir.path().join("c_copy.txt"), b"shared").unwrap();
        symlink(dir.path().join("b_dir"), dir.path().join("a_dir")).unwrap();

        delete_and_check_survivors(dir.path());

        assert!(dir.path().join("b_dir").join("f.txt").exists());
        assert!(!dir.path().join("c_copy.txt").exists());
    }

    #[test]
    fn test_delete_flag_with_followed_links_keeps_real_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("z_real.txt"), b"only copy").unwrap();
        symlink(dir.path().join("z_real.txt"), dir.path().join("a_link.txt")).unwrap();
        let root = dir.path().to_str().unwrap();

        let cli = Cli::parse_from([
            "dupsweep",
            "--quiet",
            "--no-progress",
            "--no-report",
            "--follow-symlinks",
            "--delete",
            "--permanent",
            root,
        ]);
        let code = run_app(cli).unwrap();

        assert_eq!(code, ExitCode::NoDuplicates);
        assert_eq!(fs::read(dir.path().join("z_real.txt")).unwrap(), b"only copy");
        assert_eq!(fs::read(dir.path().join("a_link.txt")).unwrap(), b"only copy");
    }
}
