//! File deletion for an executed deletion plan.
//!
//! # Overview
//!
//! This module carries out a [`DeletionPlan`]:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (with explicit flag)
//! - Size re-check before each removal
//! - Batch execution that keeps going past per-file failures
//!
//! The [`Deleter`] trait is the seam between plan execution and the
//! filesystem; [`FsDeleter`] is the real implementation.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::delete::{execute_plan, DeleteConfig, FsDeleter};
//! use dupsweep::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let outcome = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! let deleter = FsDeleter::new(DeleteConfig::trash());
//! let result = execute_plan(&outcome.plan, &deleter, None);
//! println!("{}", result.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::{ContentGroup, DeletionPlan};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since it was scanned.
    #[error("file modified since scan: {path} (expected {expected} bytes, found {actual})")]
    Modified {
        /// Path that changed
        path: PathBuf,
        /// Size recorded at scan time
        expected: u64,
        /// Size found now
        actual: u64,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// Path that could not be trashed
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed {
        /// Path that could not be removed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// A group's keeper was scheduled for deletion.
    #[error("keeper scheduled for deletion: {0}")]
    KeeperScheduled(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::KeeperScheduled(p)
            | Self::Modified { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Results of executing a deletion plan.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their reasons.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
    /// Refuse to delete a file whose size no longer matches the scan.
    pub verify_size: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            permanent: false,
            verify_size: true,
        }
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            permanent: true,
            ..Self::default()
        }
    }

    /// Enable/disable the size re-check.
    #[must_use]
    pub fn with_verify_size(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }
}

/// Removes a single planned file.
pub trait Deleter: Send + Sync {
    /// Delete `path`, which was `expected_size` bytes when scanned.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError`] describing why the file was not removed.
    fn delete(&self, path: &Path, expected_size: u64) -> Result<DeleteResult, DeleteError>;
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &Path, error: &str);

    /// Called when the whole plan has been processed.
    fn on_complete(&self, result: &BatchDeleteResult);
}

/// Filesystem-backed [`Deleter`].
#[derive(Debug, Clone, Default)]
pub struct FsDeleter {
    config: DeleteConfig,
}

impl FsDeleter {
    /// Create a deleter with the given configuration.
    #[must_use]
    pub fn new(config: DeleteConfig) -> Self {
        Self { config }
    }

    /// Whether this deleter removes files permanently.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.config.permanent
    }
}

impl Deleter for FsDeleter {
    fn delete(&self, path: &Path, expected_size: u64) -> Result<DeleteResult, DeleteError> {
        if self.config.verify_size {
            verify_size(path, expected_size)?;
        }

        if self.config.permanent {
            permanent_delete(path)
        } else {
            delete_to_trash(path)
        }
    }
}

/// Check that `path` is still a file of `expected` bytes.
///
/// # Errors
///
/// Returns [`DeleteError::Modified`] on a size mismatch, or the mapped I/O
/// error if the file cannot be examined.
pub fn verify_size(path: &Path, expected: u64) -> Result<(), DeleteError> {
    let actual = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    if actual != expected {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            path.display(),
            expected,
            actual
        );
        return Err(DeleteError::Modified {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }

    Ok(())
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Check that no group's keeper appears in the plan.
///
/// # Errors
///
/// Returns [`DeleteError::KeeperScheduled`] for the first keeper found.
pub fn validate_plan(plan: &DeletionPlan, groups: &[ContentGroup]) -> Result<(), DeleteError> {
    let keepers: HashSet<&Path> = groups.iter().filter_map(ContentGroup::keeper).collect();
    match plan.paths().find(|p| keepers.contains(p)) {
        Some(path) => Err(DeleteError::KeeperScheduled(path.to_path_buf())),
        None => Ok(()),
    }
}

/// Execute every entry of a deletion plan, in plan order.
///
/// A failed entry is recorded and execution continues with the next one.
pub fn execute_plan(
    plan: &DeletionPlan,
    deleter: &dyn Deleter,
    callback: Option<&dyn DeleteProgressCallback>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total = plan.len();

    for (index, entry) in plan.entries.iter().enumerate() {
        if let Some(cb) = callback {
            cb.on_before_delete(&entry.path, index, total);
        }

        match deleter.delete(&entry.path, entry.size) {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                if let Some(cb) = callback {
                    cb.on_delete_success(&entry.path, deleted.size);
                }
                result.successes.push(deleted);
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!("Failed to delete {}: {}", entry.path.display(), message);
                if let Some(cb) = callback {
                    cb.on_delete_failure(&entry.path, &message);
                }
                result.failures.push((entry.path.clone(), message));
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());

    result
}
