//! On-disk file identity, so one file is never listed under two paths.
//!
//! # Overview
//!
//! A file can be reachable through more than one path: a hardlink, a
//! followed symlink, or a followed symlink to a directory. Those paths share
//! one set of bytes on disk, so removing one of them as a "duplicate" of
//! another can leave only a link behind. The walker records the identity of
//! every file it yields and drops later paths to an identity it has
//! already seen.
//!
//! # Platform Support
//!
//! - **Unix**: `(device id, inode)` from the target's metadata
//! - **Other**: identity is unavailable and every path is kept

use std::collections::HashSet;
use std::fs::Metadata;

/// Identity of the file a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    /// Build the identity from metadata of the resolved file.
    ///
    /// Returns `None` where the platform exposes no stable file id.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Remembers identities already yielded during one walk.
///
/// Not thread-safe; the walker consults it from its single consuming
/// iterator, after the parallel metadata batches have joined.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: HashSet<FileIdentity>,
}

impl IdentityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identity` and report whether it was seen before.
    ///
    /// A missing identity is never treated as a repeat.
    pub fn is_repeat(&mut self, identity: Option<FileIdentity>) -> bool {
        identity.is_some_and(|id| !self.seen.insert(id))
    }

    /// Number of distinct identities recorded.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
