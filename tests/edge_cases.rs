use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_very_small_files() {
    let dir = tempdir().unwrap();

    File::create(dir.path().join("small1.txt"))
        .unwrap()
        .write_all(b"a")
        .unwrap();
    File::create(dir.path().join("small2.txt"))
        .unwrap()
        .write_all(b"a")
        .unwrap();
    File::create(dir.path().join("small3.txt"))
        .unwrap()
        .write_all(b"b")
        .unwrap();

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].size, 1);
    assert_eq!(outcome.groups[0].len(), 2);
    assert_eq!(outcome.summary.total_files, 3);
    assert_eq!(outcome.plan.len(), 1);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1")).unwrap();
    File::create(dir.path().join("empty2")).unwrap();
    File::create(dir.path().join("empty3")).unwrap();

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].size, 0);
    assert!(outcome.groups[0].keeper().unwrap().ends_with("empty1"));
    assert_eq!(outcome.plan.len(), 2);
    assert_eq!(outcome.plan.total_reclaimable_bytes, 0);
}

#[test]
fn test_content_spanning_many_chunks() {
    let dir = tempdir().unwrap();
    let mut content = vec![0u8; 10_000];
    for (i, byte) in content.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    fs::write(dir.path().join("one.bin"), &content).unwrap();
    fs::write(dir.path().join("two.bin"), &content).unwrap();

    // Same length, differs only in the final byte
    content[9_999] ^= 0xff;
    fs::write(dir.path().join("three.bin"), &content).unwrap();

    let config = FinderConfig::default().with_chunk_size(64);
    let outcome = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    let names: Vec<_> = outcome.groups[0]
        .files()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["one.bin", "two.bin"]);
    assert_eq!(outcome.summary.hashed_files, 3);
}

#[test]
fn test_special_characters_in_filenames() {
    let dir = tempdir().unwrap();
    let names = [
        "file with spaces.txt",
        "file-with-dashes.txt",
        "file_with_underscores.txt",
        "file.with.dots.txt",
        "ファイル.txt",
        "🔥.txt",
    ];

    for name in &names {
        fs::write(dir.path().join(name), b"same content").unwrap();
    }

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].len(), names.len());
    assert_eq!(outcome.plan.len(), names.len() - 1);

    // Byte order: ' ' (0x20) sorts before '-' (0x2d)
    assert!(outcome.groups[0]
        .keeper()
        .unwrap()
        .ends_with("file with spaces.txt"));
}

#[test]
fn test_deeply_nested_paths() {
    let dir = tempdir().unwrap();
    let mut deep = PathBuf::from(dir.path());
    for i in 0..40 {
        deep.push(format!("level{}", i));
    }
    fs::create_dir_all(&deep).unwrap();

    fs::write(deep.join("deep.txt"), b"nested").unwrap();
    fs::write(dir.path().join("shallow.txt"), b"nested").unwrap();

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    // "<root>/level0/..." sorts before "<root>/shallow.txt"
    assert!(outcome.groups[0].keeper().unwrap().ends_with("deep.txt"));
    assert!(outcome.plan.entries[0].path.ends_with("shallow.txt"));
}

#[test]
fn test_keeper_uses_byte_order_not_component_order() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("a").join("b"), b"xyz").unwrap();
    fs::write(dir.path().join("a.txt"), b"xyz").unwrap();

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    // '.' (0x2e) sorts before '/' (0x2f)
    assert!(outcome.groups[0].keeper().unwrap().ends_with("a.txt"));
}

#[test]
fn test_excluded_file_name_is_pruned() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep.txt"), b"dup").unwrap();
    fs::write(dir.path().join("skip.txt"), b"dup").unwrap();

    let walker = WalkerConfig::default().with_excluded_names(["skip.txt"]);
    let outcome = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker))
        .find_duplicates(dir.path())
        .unwrap();

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("real.txt"), b"target").unwrap();
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    let locked = dir.path().join("c.txt");
    fs::write(&locked, b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits
    if File::open(&locked).is_ok() {
        return;
    }

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].len(), 2);
    assert_eq!(outcome.summary.hash_failures, 1);
    assert!(outcome.summary.has_errors());
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_reported_once() {
    let dir = tempdir().unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing.txt"), dir.path().join("dangling"))
        .unwrap();

    let outcome = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(outcome.summary.total_files, 0);
    assert_eq!(outcome.summary.scan_errors.len(), 1);
    assert!(outcome.summary.scan_errors[0].path().ends_with("dangling"));
    assert!(outcome.summary.has_errors());
}
