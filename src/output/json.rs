//! JSON report for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00+02:00",
//!   "root": "/data/photos",
//!   "groups": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "keeper": "/data/photos/a.jpg",
//!       "files": ["/data/photos/a.jpg", "/data/photos/b.jpg"]
//!     }
//!   ],
//!   "plan": {
//!     "entries": [{ "path": "/data/photos/b.jpg", "size": 1024 }],
//!     "total_reclaimable_bytes": 1024
//!   },
//!   "summary": { "total_files": 100, "duplicate_groups": 1, "...": "..." },
//!   "deletion": null
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::DuplicateFinder;
//! use dupsweep::error::ExitCode;
//! use dupsweep::output::json::JsonReport;
//! use std::path::Path;
//!
//! let outcome = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! let report = JsonReport::new(Path::new("."), &outcome, ExitCode::Success);
//! let path = report.write_report(Path::new("/tmp")).unwrap();
//! println!("Report written to {}", path.display());
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::actions::BatchDeleteResult;
use crate::duplicates::{ContentGroup, DeletionPlan, ScanOutcome, ScanSummary};
use crate::error::ExitCode;

/// File name prefix of written reports.
pub const REPORT_PREFIX: &str = "dupsweep-report";

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// The member that is retained
    pub keeper: String,
    /// All members, sorted
    pub files: Vec<String>,
}

impl From<&ContentGroup> for JsonGroup {
    fn from(group: &ContentGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            keeper: group.keeper().map(display_path).unwrap_or_default(),
            files: group.files().iter().map(|p| display_path(p)).collect(),
        }
    }
}

/// A planned deletion in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPlanEntry {
    /// Path to remove
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// The deletion plan in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPlan {
    /// Entries in plan order
    pub entries: Vec<JsonPlanEntry>,
    /// Sum of entry sizes
    pub total_reclaimable_bytes: u64,
}

impl From<&DeletionPlan> for JsonPlan {
    fn from(plan: &DeletionPlan) -> Self {
        Self {
            entries: plan
                .entries
                .iter()
                .map(|e| JsonPlanEntry {
                    path: display_path(&e.path),
                    size: e.size,
                })
                .collect(),
            total_reclaimable_bytes: plan.total_reclaimable_bytes,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Total size of all enumerated files in bytes
    pub total_size: u64,
    /// Files dropped because their size was unique
    pub eliminated_by_size: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Entries skipped while walking
    pub skipped_entries: usize,
    /// Files that could not be hashed
    pub hash_failures: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of duplicate files (excluding keepers)
    pub duplicate_files: usize,
    /// Space that can be reclaimed (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            skipped_entries: summary.scan_errors.len(),
            hash_failures: summary.hash_failures,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Outcome of executing the plan, in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeletion {
    /// Paths removed
    pub deleted: Vec<String>,
    /// Paths that could not be removed, with the reason
    pub failed: Vec<JsonDeleteFailure>,
    /// Bytes actually freed
    pub bytes_freed: u64,
}

/// A failed deletion in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeleteFailure {
    /// Path that was not removed
    pub path: String,
    /// Why
    pub reason: String,
}

impl From<&BatchDeleteResult> for JsonDeletion {
    fn from(result: &BatchDeleteResult) -> Self {
        Self {
            deleted: result
                .successes
                .iter()
                .map(|s| display_path(&s.path))
                .collect(),
            failed: result
                .failures
                .iter()
                .map(|(path, reason)| JsonDeleteFailure {
                    path: display_path(path),
                    reason: reason.clone(),
                })
                .collect(),
            bytes_freed: result.bytes_freed,
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Local time the report was created
    pub generated_at: DateTime<Local>,
    /// Scanned root
    pub root: String,
    /// Confirmed duplicate groups
    pub groups: Vec<JsonGroup>,
    /// Deletion plan
    pub plan: JsonPlan,
    /// Scan statistics
    pub summary: JsonSummary,
    /// Deletion outcome, present only when the plan was executed
    pub deletion: Option<JsonDeletion>,
}

impl JsonReport {
    /// Build a report for a finished scan.
    #[must_use]
    pub fn new(root: &Path, outcome: &ScanOutcome, exit_code: ExitCode) -> Self {
        Self {
            generated_at: Local::now(),
            root: display_path(root),
            groups: outcome.groups.iter().map(JsonGroup::from).collect(),
            plan: JsonPlan::from(&outcome.plan),
            summary: JsonSummary::from_scan_summary(&outcome.summary, exit_code),
            deletion: None,
        }
    }

    /// Attach the result of executing the plan.
    #[must_use]
    pub fn with_deletion(mut self, result: &BatchDeleteResult) -> Self {
        self.deletion = Some(JsonDeletion::from(result));
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write the report as a timestamped file inside `dir` and return its path.
    ///
    /// `dir` is created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_report(&self, dir: &Path) -> Result<PathBuf, JsonOutputError> {
        fs::create_dir_all(dir).map_err(|e| JsonOutputError::Write {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = dir.join(report_file_name(&self.generated_at));
        let mut file = fs::File::create(&path).map_err(|e| JsonOutputError::Write {
            path: path.clone(),
            source: e,
        })?;
        self.write_to(&mut file, true)?;

        log::info!("Report written to {}", path.display());
        Ok(path)
    }
}

/// Report file name for a timestamp: `dupsweep-report-YYYYMMDD-HHMMSS.json`.
#[must_use]
pub fn report_file_name(time: &DateTime<Local>) -> String {
    format!("{}-{}.json", REPORT_PREFIX, time.format("%Y%m%d-%H%M%S"))
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),

    /// The report file or its directory could not be created
    #[error("cannot write report to {path}: {source}")]
    Write {
        /// Target path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
