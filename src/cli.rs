//! Command-line interface definitions for dupsweep.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under ~/Downloads (dry run, writes a JSON report)
//! dupsweep ~/Downloads
//!
//! # Skip build output as well as VCS metadata
//! dupsweep --exclude .git --exclude target .
//!
//! # Move every duplicate except the keeper to the trash
//! dupsweep --delete ~/Pictures
//!
//! # Debug logging, tighter hashing fan-out
//! dupsweep -v --hash-batch 4 /mnt/archive
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Find duplicate files by content and optionally remove all but one copy.
///
/// Files are grouped by size, then confirmed with a full BLAKE3 hash. In
/// each duplicate group the path that sorts first is kept; every other copy
/// goes into the deletion plan. Without --delete nothing is removed.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Entry name to skip at any depth, with everything below it
    ///
    /// May be repeated. Replaces the default set (.git).
    #[arg(short = 'x', long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Delete every planned duplicate (moves to trash unless --permanent)
    #[arg(long)]
    pub delete: bool,

    /// Remove files permanently instead of moving them to the trash
    ///
    /// Warning: files cannot be recovered after permanent deletion.
    #[arg(long, requires = "delete")]
    pub permanent: bool,

    /// Directory to write the JSON report into
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Do not write a JSON report
    #[arg(long, conflicts_with = "report_dir")]
    pub no_report: bool,

    /// Directory entries resolved concurrently while walking
    #[arg(long, value_name = "N")]
    pub entry_batch: Option<usize>,

    /// Files hashed concurrently while verifying
    #[arg(long, value_name = "N")]
    pub hash_batch: Option<usize>,

    /// Read chunk size for hashing (e.g. 1MiB, 512KB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,

    /// Threads used to read directories (0 = one per CPU)
    #[arg(long, value_name = "N")]
    pub walk_threads: Option<usize>,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", env = "DUPSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Parse a human-readable byte size such as `4096`, `512KB` or `1MiB`.
///
/// # Errors
///
/// Returns a message describing why the value is not a size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    s.parse::<bytesize::ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
