//! dupsweep - duplicate file finder
//!
//! Walks a directory tree, narrows candidates by size, confirms duplicates
//! with a full BLAKE3 content hash and plans the removal of every copy but
//! one (the path that sorts first).
//!
//! The library pipeline is:
//!
//! 1. [`scanner::Walker`] - enumerate regular files, skipping excluded names
//! 2. [`duplicates::group_by_size`] - keep sizes shared by 2+ files
//! 3. [`duplicates::verify_content`] - hash in bounded batches, split by digest
//! 4. [`duplicates::plan_deletions`] - choose keepers, list the rest
//!
//! [`duplicates::DuplicateFinder`] runs all four; [`run_app`] adds the
//! binary's reporting and deletion around it.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{execute_plan, validate_plan, DeleteConfig, FsDeleter};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{print_deletion, print_summary, JsonReport};
use crate::progress::Progress;

/// Run the binary end to end and return the exit code to use.
///
/// # Errors
///
/// Returns an error for invalid configuration, a root that is not a
/// directory, an interrupted scan, or a report that cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_cli_overrides(&cli);
    config.validate().context("Invalid command-line value")?;
    log::debug!("Effective configuration: {:?}", config);

    let root = std::path::absolute(&cli.path)
        .with_context(|| format!("Cannot resolve path {}", cli.path.display()))?;

    let shutdown = signal::install_handler()?;

    let progress = (!cli.quiet && !cli.no_progress).then(|| Arc::new(Progress::new(false)));

    let mut finder_config = config.finder_config().with_shutdown_flag(shutdown.get_flag());
    if let Some(ref progress) = progress {
        finder_config = finder_config.with_progress_callback(progress.clone());
    }

    let outcome = DuplicateFinder::new(finder_config).find_duplicates(&root)?;

    let mut stdout = std::io::stdout().lock();
    if !cli.quiet {
        print_summary(&mut stdout, &outcome)?;
    }

    let deletion = if cli.delete && !outcome.plan.is_empty() {
        validate_plan(&outcome.plan, &outcome.groups)?;
        let delete_config = if cli.permanent {
            DeleteConfig::permanent()
        } else {
            DeleteConfig::trash()
        };
        let callback = progress
            .as_deref()
            .map(|p| p as &dyn actions::DeleteProgressCallback);
        let result = execute_plan(&outcome.plan, &FsDeleter::new(delete_config), callback);
        if !cli.quiet {
            print_deletion(&mut stdout, &result)?;
        }
        Some(result)
    } else {
        if !outcome.plan.is_empty() && !cli.quiet {
            writeln!(stdout, "Dry run: pass --delete to remove the planned files")?;
        }
        None
    };

    let had_errors = outcome.summary.has_errors()
        || deletion.as_ref().is_some_and(|r| !r.all_succeeded());
    let exit_code = ExitCode::for_outcome(!outcome.groups.is_empty(), had_errors);

    if !cli.no_report {
        let dir = config.report_dir_for(&root);
        if std::path::absolute(&dir).is_ok_and(|dir| dir.starts_with(&root)) {
            log::warn!(
                "Report directory {} is inside the scanned tree; later scans will list the report",
                dir.display()
            );
        }
        let mut report = JsonReport::new(&root, &outcome, exit_code);
        if let Some(ref result) = deletion {
            report = report.with_deletion(result);
        }
        let path = report.write_report(&dir)?;
        if !cli.quiet {
            writeln!(stdout, "Report: {}", path.display())?;
        }
    }

    Ok(exit_code)
}
