//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the structures that flow between pipeline stages:
//! [`SizeGroup`] (output of size grouping), [`ContentGroup`] (output of
//! content verification) and [`PathSizeIndex`] (read-only size lookup built
//! from the initial enumeration).
//!
//! ## Size Grouping
//!
//! Size grouping is the first narrowing step. Files with different sizes
//! cannot be duplicates, so only buckets holding two or more files move on
//! to content hashing.
//!
//! # Example
//!
//! ```
//! use dupsweep::scanner::FileRecord;
//! use dupsweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{FileRecord, Hash};

/// Order two paths by the bytes of their full path string.
///
/// This differs from `Path`'s own `Ord`, which compares component by
/// component: `/a.txt` sorts before `/a/b` here because `.` < `/`.
#[must_use]
pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    a.as_os_str().cmp(b.as_os_str())
}

/// Sort paths in place using [`compare_paths`].
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| compare_paths(a, b));
}

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<PathBuf>,
}

impl SizeGroup {
    /// Create a size group with its member paths.
    #[must_use]
    pub fn new(size: u64, files: Vec<PathBuf>) -> Self {
        Self { size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Confirmed duplicate group: files whose full-content digests are equal.
///
/// Members are kept sorted by [`compare_paths`], so the first member is
/// always the keeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentGroup {
    /// BLAKE3 hash of the shared content
    pub hash: Hash,
    /// File size in bytes
    pub size: u64,
    /// Member paths, sorted
    files: Vec<PathBuf>,
}

impl ContentGroup {
    /// Create a content group; member paths are sorted on construction.
    #[must_use]
    pub fn new(hash: Hash, size: u64, mut files: Vec<PathBuf>) -> Self {
        sort_paths(&mut files);
        Self { hash, size, files }
    }

    /// Sorted member paths.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The retained member: the smallest path in byte order.
    #[must_use]
    pub fn keeper(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    /// Every member except the keeper, in sorted order.
    #[must_use]
    pub fn duplicates(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or(&[])
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 keeper).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space held by the non-keeper copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        crate::scanner::hash_to_hex(&self.hash)
    }
}

/// Read-only `path → size` lookup built from the initial enumeration.
#[derive(Debug, Clone, Default)]
pub struct PathSizeIndex {
    sizes: HashMap<PathBuf, u64>,
}

impl PathSizeIndex {
    /// Build the index from enumerated records.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a FileRecord>) -> Self {
        Self {
            sizes: records
                .into_iter()
                .map(|r| (r.path.clone(), r.size))
                .collect(),
        }
    }

    /// Size recorded for `path`, if it was enumerated.
    #[must_use]
    pub fn size_of(&self, path: &Path) -> Option<u64> {
        self.sizes.get(path).copied()
    }

    /// Number of indexed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of zero-byte files seen
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size.
///
/// Two passes: every path goes into a bucket keyed by its exact size, then
/// buckets with fewer than two members are dropped. A bucket cannot be
/// declared unique until every record has been seen.
///
/// Group order in the returned vector is unspecified.
///
/// # Example
///
/// ```
/// use dupsweep::scanner::FileRecord;
/// use dupsweep::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100),
///     FileRecord::new(PathBuf::from("/b.txt"), 100),
///     FileRecord::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].size, 100);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    records: impl IntoIterator<Item = FileRecord>,
) -> (Vec<SizeGroup>, GroupingStats) {
    let mut buckets: HashMap<u64, Vec<PathBuf>> = HashMap::new();
    let mut stats = GroupingStats::default();

    // First pass: accumulate every path under its size
    for record in records {
        stats.total_files += 1;
        stats.total_size += record.size;
        if record.size == 0 {
            stats.empty_files += 1;
        }
        buckets.entry(record.size).or_default().push(record.path);
    }

    stats.unique_sizes = buckets.len();

    // Second pass: keep only buckets that can hold a duplicate
    let groups: Vec<SizeGroup> = buckets
        .into_iter()
        .filter_map(|(size, files)| {
            if files.len() < 2 {
                stats.eliminated_unique += files.len();
                log::trace!("Eliminated unique size {}: {:?}", size, files.first());
                None
            } else {
                stats.potential_duplicates += files.len();
                stats.duplicate_groups += 1;
                log::debug!(
                    "Size group {} bytes: {} potential duplicates",
                    size,
                    files.len()
                );
                Some(SizeGroup::new(size, files))
            }
        })
        .collect();

    log::info!(
        "Size grouping complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}
