//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Full-content verification with bounded hashing batches
//! - Keeper selection and deletion planning

pub mod finder;
pub mod groups;
pub mod planner;

pub use finder::{
    verify_content, DuplicateFinder, FinderConfig, FinderError, ScanOutcome, ScanSummary,
    VerifyConfig, VerifyStats, DEFAULT_HASH_BATCH_WIDTH,
};
pub use groups::{
    compare_paths, group_by_size, sort_paths, ContentGroup, GroupingStats, PathSizeIndex,
    SizeGroup,
};
pub use planner::{plan_deletions, DeletionPlan, PlanEntry};
