//! Logging setup for dupsweep.
//!
//! Uses the `log` facade with an `env_logger` backend. The level comes from:
//!
//! 1. `RUST_LOG` (if set)
//! 2. `--quiet` (errors only) or `--verbose` (`-v` debug, `-vv` trace)
//! 3. Default: info
//!
//! Debug builds and verbose runs prefix each line with a timestamp and the
//! emitting module; plain release runs print only level and message.
//!
//! ```rust,no_run
//! use dupsweep::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Line layout used by the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFormat {
    /// Level and message only
    Compact,
    /// Timestamp, level and message
    Timestamped,
    /// Timestamp, level, module path and message
    Detailed,
}

/// Initialize the logger from CLI verbosity flags.
///
/// Calling this more than once is harmless: later calls are ignored with a
/// debug message.
pub fn init_logging(verbose: u8, quiet: bool) {
    let rust_log = env::var("RUST_LOG").ok();
    let mut builder = Builder::new();

    match rust_log {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }

    let format = line_format(verbose, cfg!(debug_assertions));
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        match format {
            LineFormat::Compact => {
                writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
            }
            LineFormat::Timestamped => writeln!(
                buf,
                "{} {style}{:<5}{style:#} {}",
                buf.timestamp_seconds(),
                level,
                record.args()
            ),
            LineFormat::Detailed => writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            ),
        }
    });

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }

    match rust_log {
        Some(spec) => log::debug!("Logging initialized from RUST_LOG={}", spec),
        None => log::debug!(
            "Logging initialized at level: {}",
            current_level_name()
        ),
    }
}

/// Map CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn line_format(verbose: u8, debug_build: bool) -> LineFormat {
    match (verbose, debug_build) {
        (0, false) => LineFormat::Compact,
        (0, true) => LineFormat::Timestamped,
        _ => LineFormat::Detailed,
    }
}

/// Name of the maximum enabled log level.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
