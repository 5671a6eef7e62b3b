//! Output formatters for duplicate scan results.
//!
//! - `text`: human-readable group listing and totals on stdout
//! - `json`: timestamped machine-readable report file
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::DuplicateFinder;
//! use dupsweep::error::ExitCode;
//! use dupsweep::output::{json::JsonReport, text::print_summary};
//! use std::path::Path;
//!
//! let outcome = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! print_summary(&mut std::io::stdout(), &outcome).unwrap();
//!
//! let report = JsonReport::new(Path::new("."), &outcome, ExitCode::Success);
//! println!("{}", report.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutputError, JsonReport};
pub use text::{print_deletion, print_summary};
