//! Deletion planning for confirmed duplicate groups.
//!
//! Every [`ContentGroup`] keeps exactly one member, the smallest path in
//! case-sensitive byte order, and contributes all other members to the
//! [`DeletionPlan`] in that same order. Groups are visited in keeper order,
//! so an unchanged tree always yields an identical plan.
//!
//! Planning is pure: no I/O, no failure modes.
//!
//! # Example
//!
//! ```
//! use dupsweep::duplicates::{plan_deletions, ContentGroup, PathSizeIndex};
//! use dupsweep::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/b.txt"), 5),
//!     FileRecord::new(PathBuf::from("/a.txt"), 5),
//! ];
//! let index = PathSizeIndex::from_records(&records);
//! let group = ContentGroup::new([0; 32], 5, records.into_iter().map(|r| r.path).collect());
//!
//! let plan = plan_deletions(&[group], &index);
//! assert_eq!(plan.entries[0].path, PathBuf::from("/b.txt"));
//! assert_eq!(plan.total_reclaimable_bytes, 5);
//! ```

use std::path::PathBuf;

use super::groups::{compare_paths, ContentGroup, PathSizeIndex};

/// A single file scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Path to remove
    pub path: PathBuf,
    /// Size recorded at enumeration time
    pub size: u64,
}

/// Ordered list of non-keeper duplicates plus the bytes they occupy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    /// Entries in deterministic order
    pub entries: Vec<PlanEntry>,
    /// Sum of every entry's size
    pub total_reclaimable_bytes: u64,
}

impl DeletionPlan {
    /// Number of planned deletions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over planned paths.
    pub fn paths(&self) -> impl Iterator<Item = &std::path::Path> {
        self.entries.iter().map(|e| e.path.as_path())
    }
}

/// Build the deletion plan for a set of confirmed duplicate groups.
///
/// Sizes come from `index`; a path missing from the index falls back to the
/// group's size.
#[must_use]
pub fn plan_deletions(groups: &[ContentGroup], index: &PathSizeIndex) -> DeletionPlan {
    let mut ordered: Vec<&ContentGroup> = groups.iter().filter(|g| g.len() > 1).collect();
    ordered.sort_by(|a, b| match (a.keeper(), b.keeper()) {
        (Some(x), Some(y)) => compare_paths(x, y),
        _ => std::cmp::Ordering::Equal,
    });

    let mut plan = DeletionPlan::default();
    for group in ordered {
        for path in group.duplicates() {
            let size = index.size_of(path).unwrap_or(group.size);
            plan.total_reclaimable_bytes += size;
            plan.entries.push(PlanEntry {
                path: path.clone(),
                size,
            });
        }
        log::debug!(
            "Keeping {:?}, planning {} deletion(s) for group {}",
            group.keeper(),
            group.duplicate_count(),
            group.hash_hex()
        );
    }

    log::info!(
        "Deletion plan: {} file(s), {} bytes reclaimable",
        plan.len(),
        plan.total_reclaimable_bytes
    );

    plan
}
