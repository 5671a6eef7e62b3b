use dupsweep::config::Config;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
excluded_names = [".git", "node_modules"]
hash_batch_width = 4
chunk_size = 65536
follow_symlinks = true
report_dir = "/var/tmp/reports"
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert_eq!(config.excluded_names, vec![".git", "node_modules"]);
    assert_eq!(config.hash_batch_width, 4);
    assert_eq!(config.chunk_size, 65536);
    assert!(config.follow_symlinks);
    assert_eq!(config.entry_batch_width, 100);
    assert_eq!(
        config.report_dir.as_deref(),
        Some(std::path::Path::new("/var/tmp/reports"))
    );
}

#[test]
fn test_config_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "entry_batch_width = 5\n").unwrap();

    std::env::set_var("DUPSWEEP_TEST_ENTRY_BATCH_WIDTH", "7");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DUPSWEEP_TEST_"))
        .extract()
        .unwrap();
    std::env::remove_var("DUPSWEEP_TEST_ENTRY_BATCH_WIDTH");

    assert_eq!(config.entry_batch_width, 7);
}

#[test]
fn test_config_load_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "hash_batch_width = 0\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("hash_batch_width"));
}

#[test]
fn test_config_invalid_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "hash_batch_width = \"many\"\n").unwrap();

    assert!(Config::load(Some(&path)).is_err());
}

#[test]
fn test_config_load_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "walk_threads = 2\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.walk_threads, 2);
}
