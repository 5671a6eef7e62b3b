//! Content verification and the duplicate finder pipeline.
//!
//! # Overview
//!
//! This module orchestrates duplicate detection:
//! 1. **Walk** - Enumerate regular files under the root (see [`crate::scanner::Walker`])
//! 2. **Size grouping** - Bucket files by exact size (see [`crate::duplicates::groups`])
//! 3. **Content verification** - Hash every size-group member and split by digest
//! 4. **Planning** - Choose keepers and list the rest (see [`crate::duplicates::planner`])
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{FileRecord, Hasher, Walker, WalkerConfig};
//! use dupsweep::duplicates::{group_by_size, verify_content, VerifyConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<FileRecord> = walker.walk().unwrap().filter_map(Result::ok).collect();
//! let (size_groups, _) = group_by_size(files);
//!
//! let hasher = Hasher::new();
//! let (groups, stats) = verify_content(size_groups, &hasher, VerifyConfig::default());
//!
//! println!("{} duplicate groups, {} bytes wasted", groups.len(), stats.wasted_space);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{compare_paths, group_by_size, ContentGroup, PathSizeIndex, SizeGroup};
use super::planner::{plan_deletions, DeletionPlan};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{
    FileRecord, Hash, HashError, Hasher, ScanError, Walker, WalkerConfig, DEFAULT_CHUNK_SIZE,
};

/// Default number of files hashed concurrently.
pub const DEFAULT_HASH_BATCH_WIDTH: usize = 10;

/// Files larger than this are logged when hashing starts (100 MiB).
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

// ============================================================================
// Content verification
// ============================================================================

/// Configuration for content verification.
#[derive(Clone)]
pub struct VerifyConfig {
    /// Maximum number of files hashed at the same time.
    pub hash_batch_width: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("hash_batch_width", &self.hash_batch_width)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            hash_batch_width: DEFAULT_HASH_BATCH_WIDTH,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl VerifyConfig {
    /// Set the hash batch width (minimum 1).
    #[must_use]
    pub fn with_hash_batch_width(mut self, width: usize) -> Self {
        self.hash_batch_width = width.max(1);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
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
}

/// Statistics from content verification.
#[derive(Debug, Default)]
pub struct VerifyStats {
    /// Number of files handed to the verifier
    pub input_files: usize,
    /// Number of files hashed successfully
    pub hashed_files: usize,
    /// Number of files that could not be hashed
    pub failed_files: usize,
    /// Per-file hashing failures
    pub errors: Vec<HashError>,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of duplicate files (excluding keepers)
    pub duplicate_files: usize,
    /// Space held by non-keeper copies
    pub wasted_space: u64,
    /// Whether verification stopped early on shutdown
    pub interrupted: bool,
}

impl VerifyStats {
    fn record_groups(&mut self, groups: &[ContentGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(ContentGroup::duplicate_count).sum();
        self.wasted_space = groups.iter().map(ContentGroup::wasted_space).sum();
    }
}

/// Confirm duplicates by hashing the full content of every size-group member.
///
/// Size groups are processed smallest first. Within a group the members are
/// split into batches of `hash_batch_width`; a batch is hashed in parallel
/// and fully joined before the next batch starts. Once a group is done its
/// members are partitioned by digest and partitions with fewer than two
/// members are discarded.
///
/// A file that cannot be hashed is logged, recorded in
/// [`VerifyStats::errors`] and left out of every group.
///
/// The returned groups are sorted by keeper.
#[must_use]
pub fn verify_content(
    mut size_groups: Vec<SizeGroup>,
    hasher: &Hasher,
    config: VerifyConfig,
) -> (Vec<ContentGroup>, VerifyStats) {
    let total: usize = size_groups.iter().map(SizeGroup::len).sum();
    let mut stats = VerifyStats {
        input_files: total,
        ..Default::default()
    };

    if total == 0 {
        log::debug!("Verification: No files to process");
        return (Vec::new(), stats);
    }

    size_groups.sort_by_key(|g| g.size);
    let batch_width = config.hash_batch_width.max(1);

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_HASHING, total);
    }

    log::info!(
        "Verification: Hashing {} files in {} size groups (batch width {})",
        total,
        size_groups.len(),
        batch_width
    );

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(batch_width)
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!(
                "Failed to create hashing thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            None
        }
    };

    let processed = AtomicUsize::new(0);
    let mut content_groups = Vec::new();

    'groups: for group in size_groups {
        let size = group.size;
        let mut by_digest: HashMap<Hash, Vec<PathBuf>> = HashMap::new();

        for batch in group.files.chunks(batch_width) {
            if config.is_shutdown_requested() {
                stats.interrupted = true;
                break 'groups;
            }

            let hash_batch = || -> Vec<(&PathBuf, Result<Hash, HashError>)> {
                batch
                    .par_iter()
                    .map(|path| {
                        let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                        if let Some(ref callback) = config.progress_callback {
                            callback.on_progress(current, path.to_string_lossy().as_ref());
                        }
                        if size > LARGE_FILE_THRESHOLD {
                            log::debug!(
                                "Hashing large file ({} MB): {}",
                                size / (1024 * 1024),
                                path.display()
                            );
                        }
                        (path, hasher.full_hash(path))
                    })
                    .collect()
            };

            let results = match pool {
                Some(ref pool) => pool.install(hash_batch),
                None => hash_batch(),
            };

            // Batch barrier: merge this batch into the group's digest buckets
            for (path, result) in results {
                match result {
                    Ok(digest) => {
                        stats.hashed_files += 1;
                        stats.bytes_hashed += size;
                        if let Some(ref callback) = config.progress_callback {
                            callback.on_item_completed(size);
                        }
                        by_digest.entry(digest).or_default().push(path.clone());
                    }
                    Err(HashError::Interrupted(_)) => {
                        stats.interrupted = true;
                    }
                    Err(e) => {
                        log::warn!("Failed to hash {}: {}", path.display(), e);
                        stats.failed_files += 1;
                        stats.errors.push(e);
                    }
                }
            }

            if stats.interrupted {
                break 'groups;
            }
        }

        for (digest, files) in by_digest {
            if files.len() < 2 {
                continue;
            }
            let content_group = ContentGroup::new(digest, size, files);
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                content_group.hash_hex(),
                content_group.len(),
                size
            );
            content_groups.push(content_group);
        }
    }

    if stats.interrupted {
        log::info!("Verification: Interrupted by shutdown signal");
    }

    content_groups.sort_by(|a, b| match (a.keeper(), b.keeper()) {
        (Some(x), Some(y)) => compare_paths(x, y),
        _ => std::cmp::Ordering::Equal,
    });
    stats.record_groups(&content_groups);

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_HASHING);
    }

    log::info!(
        "Verification complete: {} groups, {} duplicates, {} bytes reclaimable, {} failures",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_space,
        stats.failed_files
    );

    (content_groups, stats)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Traversal settings.
    pub walker_config: WalkerConfig,
    /// Maximum number of files hashed at the same time.
    pub hash_batch_width: usize,
    /// Read chunk size for hashing, in bytes.
    pub chunk_size: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("hash_batch_width", &self.hash_batch_width)
            .field("chunk_size", &self.chunk_size)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            hash_batch_width: DEFAULT_HASH_BATCH_WIDTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the traversal configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the hash batch width (minimum 1).
    #[must_use]
    pub fn with_hash_batch_width(mut self, width: usize) -> Self {
        self.hash_batch_width = width.max(1);
        self
    }

    /// Set the hashing read chunk size (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
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

    fn verify_config(&self) -> VerifyConfig {
        VerifyConfig {
            hash_batch_width: self.hash_batch_width,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Total size of all enumerated files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files hashed successfully
    pub hashed_files: usize,
    /// Number of files that could not be hashed
    pub hash_failures: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding keepers)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Entries skipped during traversal
    pub scan_errors: Vec<ScanError>,
    /// Files skipped during hashing
    pub hash_errors: Vec<HashError>,
}

impl ScanSummary {
    /// Percentage of the scanned bytes held by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Whether any entry or file was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty() || !self.hash_errors.is_empty()
    }
}

/// Result of a complete scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Confirmed duplicate groups, sorted by keeper
    pub groups: Vec<ContentGroup>,
    /// Deletion plan derived from `groups`
    pub plan: DeletionPlan,
    /// Scan statistics
    pub summary: ScanSummary,
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The root path does not resolve to a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Duplicate finder that runs the whole detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_hash_batch_width(4));
/// let outcome = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate groups", outcome.summary.duplicate_groups);
/// println!("Planned deletions: {}", outcome.plan.len());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new().with_chunk_size(config.chunk_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under `path`.
    ///
    /// Entries that cannot be read are skipped and collected in
    /// [`ScanSummary::scan_errors`].
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::NotADirectory`] if `path` is not a directory
    /// and [`FinderError::Interrupted`] if shutdown is requested.
    pub fn find_duplicates(&self, path: &Path) -> Result<ScanOutcome, FinderError> {
        let start_time = Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        // walk() only fails before traversal, when the root is not a directory
        let entries = walker
            .walk()
            .map_err(|e| FinderError::NotADirectory(e.path().to_path_buf()))?;
        log::info!("Starting duplicate scan of {}", path.display());

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut records = Vec::new();
        let mut scan_errors = Vec::new();
        for result in entries {
            match result {
                Ok(record) => records.push(record),
                // Already logged by the walker
                Err(e) => scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Scan interrupted during walk");
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Walk complete: {} files, {} skipped entries",
            records.len(),
            scan_errors.len()
        );

        let mut outcome = self.find_duplicates_from_records(records)?;
        outcome.summary.scan_errors = scan_errors;
        outcome.summary.scan_duration = start_time.elapsed();
        Ok(outcome)
    }

    /// Run grouping, verification and planning over pre-enumerated records.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown is requested.
    pub fn find_duplicates_from_records(
        &self,
        records: Vec<FileRecord>,
    ) -> Result<ScanOutcome, FinderError> {
        let start_time = Instant::now();
        let index = PathSizeIndex::from_records(&records);

        let (size_groups, grouping) = group_by_size(records);

        let (groups, verify) =
            verify_content(size_groups, &self.hasher, self.config.verify_config());

        if verify.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let plan = plan_deletions(&groups, &index);

        let summary = ScanSummary {
            total_files: grouping.total_files,
            total_size: grouping.total_size,
            eliminated_by_size: grouping.eliminated_unique,
            hashed_files: verify.hashed_files,
            hash_failures: verify.failed_files,
            duplicate_groups: verify.duplicate_groups,
            duplicate_files: plan.len(),
            reclaimable_space: plan.total_reclaimable_bytes,
            scan_duration: start_time.elapsed(),
            interrupted: false,
            scan_errors: Vec::new(),
            hash_errors: verify.errors,
        };

        log::info!(
            "Scan complete: {} duplicate groups, {} files to remove, {} bytes reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_space
        );

        Ok(ScanOutcome {
            groups,
            plan,
            summary,
        })
    }
}
