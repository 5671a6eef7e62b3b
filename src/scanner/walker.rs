//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting `(path, size)` records for duplicate detection.
//!
//! # Features
//!
//! - Parallel directory reads on a rayon pool (via jwalk)
//! - Excluded entry names are pruned from each listing before descent
//! - Entry metadata resolved in bounded parallel batches per directory
//! - A file reachable through several paths (hardlinks, followed links) is
//!   yielded once, under the first path in walk order
//! - Per-entry failures are yielded as errors, never abort the walk
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_excluded_names([".git", "node_modules"]);
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! for entry in walker.walk().unwrap() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::{Parallelism, WalkDirGeneric};
use rayon::prelude::*;

use super::identity::{FileIdentity, IdentityTracker};
use super::{FileRecord, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Result of resolving one directory entry, computed inside `process_read_dir`.
#[derive(Debug, Default)]
enum EntryStat {
    /// Not resolved yet (directories, or entries jwalk added after the batch).
    #[default]
    Pending,
    /// Regular file with its byte length and on-disk identity.
    File {
        size: u64,
        identity: Option<FileIdentity>,
    },
    /// Intact symlink (when not following), FIFO, socket, device or directory target.
    Skipped,
    /// Metadata lookup failed.
    Failed(std::io::Error),
}

type WalkState = ((), EntryStat);

/// Directory walker for parallel file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback, notified once per discovered file.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Make the root absolute and check that it is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotADirectory`] if the root is missing or is not
    /// a directory.
    pub fn resolve_root(&self) -> Result<PathBuf, ScanError> {
        let root = std::path::absolute(&self.root)
            .map_err(|_| ScanError::NotADirectory(self.root.clone()))?;
        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => Ok(root),
            Ok(_) => Err(ScanError::NotADirectory(root)),
            Err(e) => {
                log::debug!("Cannot stat root {}: {}", root.display(), e);
                Err(ScanError::NotADirectory(root))
            }
        }
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Per-entry failures are yielded as [`ScanError`] values rather than
    /// stopping iteration.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotADirectory`] before walking anything if the
    /// root does not resolve to a directory.
    pub fn walk(
        &self,
    ) -> Result<impl Iterator<Item = Result<FileRecord, ScanError>> + '_, ScanError> {
        let root = self.resolve_root()?;
        let excluded = self.config.excluded_names.clone();
        let batch_width = self.config.entry_batch_width.max(1);
        let follow = self.config.follow_symlinks;

        let walk_dir = WalkDirGeneric::<WalkState>::new(&root)
            .follow_links(follow)
            .skip_hidden(false)
            .parallelism(Parallelism::RayonNewPool(self.config.threads))
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Excluded entries never reach the iterator and are never descended into
                children.retain(|child| {
                    child
                        .as_ref()
                        .map_or(true, |entry| !excluded.contains(entry.file_name()))
                });

                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });

                for batch in children.chunks_mut(batch_width) {
                    batch.par_iter_mut().for_each(|child| {
                        if let Ok(entry) = child {
                            if !entry.file_type().is_dir() {
                                entry.client_state = stat_entry(&entry.path(), follow);
                            }
                        }
                    });
                }
            });

        let mut discovered = 0usize;
        let mut identities = IdentityTracker::new();

        Ok(walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(mut entry) => {
                    if entry.file_type().is_dir() {
                        return None;
                    }

                    let path = entry.path();
                    let stat = match std::mem::take(&mut entry.client_state) {
                        EntryStat::Pending => stat_entry(&path, follow),
                        resolved => resolved,
                    };

                    match stat {
                        EntryStat::File { size, identity } => {
                            if identities.is_repeat(identity) {
                                log::debug!(
                                    "Skipping second path to an already listed file: {}",
                                    path.display()
                                );
                                return None;
                            }
                            discovered += 1;
                            if let Some(ref callback) = self.progress_callback {
                                callback.on_progress(discovered, path.to_string_lossy().as_ref());
                            }
                            Some(Ok(FileRecord::new(path, size)))
                        }
                        EntryStat::Failed(e) => Some(Err(self.handle_io_error(&path, e))),
                        EntryStat::Skipped | EntryStat::Pending => {
                            log::trace!("Skipping non-regular entry: {}", path.display());
                            None
                        }
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, e)))
                }
            }
        }))
    }

    /// Handle I/O errors during entry access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::warn!("Entry vanished or dangling: {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle jwalk errors (directory read failures, link loops).
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
            // Dangling symlinks surface here when jwalk follows links itself
            Some(ErrorKind::NotFound) => ScanError::NotFound(path),
            _ => ScanError::Io {
                path,
                source: std::io::Error::other(error.to_string()),
            },
        }
    }
}

/// Resolve the size and identity of a non-directory entry.
///
/// Symlinks are always resolved so a dangling link is reported even when
/// links are not followed.
fn stat_entry(path: &Path, follow_symlinks: bool) -> EntryStat {
    let link_metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) => return EntryStat::Failed(e),
    };

    let metadata = if link_metadata.file_type().is_symlink() {
        match fs::metadata(path) {
            Ok(_) if !follow_symlinks => return EntryStat::Skipped,
            Ok(m) => m,
            Err(e) => return EntryStat::Failed(e),
        }
    } else {
        link_metadata
    };

    if metadata.is_file() {
        EntryStat::File {
            size: metadata.len(),
            identity: FileIdentity::from_metadata(&metadata),
        }
    } else {
        EntryStat::Skipped
    }
}
