use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::scanner::WalkerConfig;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(outcome.groups.is_empty());
    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.plan.total_reclaimable_bytes, 0);
    assert_eq!(outcome.summary.total_files, 0);
}

#[test]
fn test_scan_hello_world_scenario() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    let group = &outcome.groups[0];
    let names: Vec<_> = group
        .files()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert!(group.keeper().unwrap().ends_with("a.txt"));

    assert_eq!(outcome.plan.len(), 1);
    assert!(outcome.plan.entries[0].path.ends_with("b.txt"));
    assert_eq!(outcome.plan.total_reclaimable_bytes, 5);
    assert!(outcome
        .groups
        .iter()
        .all(|g| g.files().iter().all(|p| !p.ends_with("c.txt"))));
}

#[test]
fn test_scan_unique_sizes_never_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one", b"1");
    write(dir.path(), "two", b"22");
    write(dir.path(), "three", b"333");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.summary.total_files, 3);
    assert_eq!(outcome.summary.eliminated_by_size, 3);
    assert_eq!(outcome.summary.hashed_files, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.bin", b"nested duplicate");
    write(dir.path(), "a/b/c/deep.bin", b"nested duplicate");
    write(dir.path(), "a/sibling.bin", b"nested duplicate");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].len(), 3);
    assert_eq!(outcome.plan.len(), 2);
    assert_eq!(outcome.plan.total_reclaimable_bytes, 2 * 16);
}

#[test]
fn test_excluded_name_three_levels_deep() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.txt", b"same bytes");
    write(dir.path(), "x/y/z/node_modules/hidden.txt", b"same bytes");
    write(dir.path(), "x/y/z/node_modules/inner/more.txt", b"same bytes");

    let walker_config = WalkerConfig::default().with_excluded_names(["node_modules"]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let outcome = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(outcome.summary.total_files, 1);
    assert!(outcome.groups.is_empty());
}

#[test]
fn test_git_directory_excluded_by_default() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/file", b"object");
    write(dir.path(), ".git/objects/ab/file", b"object");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.summary.total_files, 1);
    assert!(outcome.groups.is_empty());
}

#[test]
fn test_same_size_different_content_not_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"abcd");
    write(dir.path(), "b", b"abce");
    write(dir.path(), "c", b"abcd");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert!(outcome.groups[0].files().iter().all(|p| !p.ends_with("b")));
    assert_eq!(outcome.summary.hashed_files, 3);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].size, 0);
    assert_eq!(outcome.plan.total_reclaimable_bytes, 0);
}

#[test]
fn test_monotonic_narrowing() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        let content = format!("content-{}", i % 4);
        write(dir.path(), &format!("d{}/f{}", i % 3, i), content.as_bytes());
    }
    write(dir.path(), "odd-size", b"no partner here");

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let grouped: HashSet<&Path> = outcome
        .groups
        .iter()
        .flat_map(|g| g.files().iter().map(PathBuf::as_path))
        .collect();
    assert_eq!(grouped.len(), 12);
    assert!(grouped.len() <= outcome.summary.total_files);
    assert!(!grouped.iter().any(|p| p.ends_with("odd-size")));

    for group in &outcome.groups {
        assert!(group.len() >= 2);
    }
    assert_eq!(outcome.groups.len(), 4);
    assert_eq!(outcome.plan.len(), 8);
}

#[test]
fn test_two_runs_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(dir.path(), &format!("n{:02}/file", i), &[b'a' + (i % 5) as u8; 64]);
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_hash_batch_width(3));
    let first = finder.find_duplicates(dir.path()).unwrap();
    let second = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.plan, second.plan);
}

#[test]
fn test_root_is_a_file() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "file.txt", b"x");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&file)
        .unwrap_err();
    assert!(err.to_string().contains("Not a directory"));
}
