//! Layered configuration.
//!
//! Settings are merged in this order, later sources winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config <FILE>` or `config.toml` in the platform config
//!    directory (e.g. `~/.config/dupsweep/config.toml`)
//! 3. `DUPSWEEP_*` environment variables (e.g. `DUPSWEEP_HASH_BATCH_WIDTH=4`)
//! 4. Command-line flags
//!
//! ```toml
//! excluded_names = [".git", "node_modules"]
//! hash_batch_width = 8
//! chunk_size = 524288
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::{FinderConfig, DEFAULT_HASH_BATCH_WIDTH};
use crate::scanner::{
    WalkerConfig, DEFAULT_CHUNK_SIZE, DEFAULT_ENTRY_BATCH_WIDTH, DEFAULT_EXCLUDED_NAME,
};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be parsed or had the wrong shape.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Entry names skipped at any depth, together with their subtrees.
    pub excluded_names: Vec<String>,
    /// Directory entries resolved concurrently while walking.
    pub entry_batch_width: usize,
    /// Files hashed concurrently while verifying.
    pub hash_batch_width: usize,
    /// Read chunk size for hashing, in bytes.
    pub chunk_size: usize,
    /// Walker threads (0 = one per CPU).
    pub walk_threads: usize,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Directory for JSON reports (default: see [`Config::report_dir_for`]).
    pub report_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_names: vec![DEFAULT_EXCLUDED_NAME.to_string()],
            entry_batch_width: DEFAULT_ENTRY_BATCH_WIDTH,
            hash_batch_width: DEFAULT_HASH_BATCH_WIDTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            walk_threads: 0,
            follow_symlinks: false,
            report_dir: None,
        }
    }
}

impl Config {
    /// Default platform-specific config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupsweep", "dupsweep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Platform data directory for reports (e.g. `~/.local/share/dupsweep/reports`).
    #[must_use]
    pub fn default_report_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupsweep", "dupsweep")
            .map(|dirs| dirs.data_local_dir().join("reports"))
    }

    /// Directory the report for a scan of `root` is written to.
    ///
    /// A configured `report_dir` is used as is. Otherwise the first of
    /// [`Config::default_report_dir`] and the system temp directory that lies
    /// outside `root` is chosen, so a report never lands in the tree it
    /// describes.
    #[must_use]
    pub fn report_dir_for(&self, root: &Path) -> PathBuf {
        if let Some(ref dir) = self.report_dir {
            return dir.clone();
        }
        Self::default_report_dir()
            .into_iter()
            .chain(std::iter::once(std::env::temp_dir()))
            .find(|dir| !dir.starts_with(root))
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Build the provider chain without extracting it.
    ///
    /// A missing file at the default location is skipped silently.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file.map(Path::to_path_buf).or_else(Self::default_path) {
            log::debug!("Config file: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load defaults, file and environment, then validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `file` is given but missing,
    /// [`ConfigError::Load`] on malformed input and
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let config: Self = Self::figment(file).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded values.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if !cli.exclude.is_empty() {
            self.excluded_names = cli.exclude.clone();
        }
        if let Some(width) = cli.entry_batch {
            self.entry_batch_width = width;
        }
        if let Some(width) = cli.hash_batch {
            self.hash_batch_width = width;
        }
        if let Some(size) = cli.chunk_size {
            self.chunk_size = usize::try_from(size).unwrap_or(usize::MAX);
        }
        if let Some(threads) = cli.walk_threads {
            self.walk_threads = threads;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if cli.report_dir.is_some() {
            self.report_dir = cli.report_dir.clone();
        }
        self
    }

    /// Reject values that would make a bound unbounded or meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("entry_batch_width", self.entry_batch_width),
            ("hash_batch_width", self.hash_batch_width),
            ("chunk_size", self.chunk_size),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if let Some(name) = self
            .excluded_names
            .iter()
            .find(|n| n.is_empty() || n.contains(['/', '\\']))
        {
            return Err(ConfigError::Invalid {
                field: "excluded_names",
                reason: format!("'{}' is not a single path component", name),
            });
        }

        Ok(())
    }

    /// Traversal settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_excluded_names(self.excluded_names.iter().cloned())
            .with_entry_batch_width(self.entry_batch_width)
            .with_threads(self.walk_threads)
            .with_follow_symlinks(self.follow_symlinks)
    }

    /// Pipeline settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_walker_config(self.walker_config())
            .with_hash_batch_width(self.hash_batch_width)
            .with_chunk_size(self.chunk_size)
    }
}
