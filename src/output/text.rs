//! Human-readable summary printed at the end of a run.

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::actions::BatchDeleteResult;
use crate::duplicates::ScanOutcome;

/// Print every duplicate group and the run totals.
///
/// ```text
/// [1] 5 B x 2  (blake3 2cf24dba5fb0...)
///     keep   /tmp/t/a.txt
///     delete /tmp/t/b.txt
///
/// Scanned 3 files (15 B); 1 duplicate group(s), 1 file(s) to delete, 5 B reclaimable
/// ```
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn print_summary<W: Write>(writer: &mut W, outcome: &ScanOutcome) -> io::Result<()> {
    for (index, group) in outcome.groups.iter().enumerate() {
        let hash = group.hash_hex();
        writeln!(
            writer,
            "[{}] {} x {}  (blake3 {}...)",
            index + 1,
            ByteSize(group.size),
            group.len(),
            &hash[..12]
        )?;
        if let Some(keeper) = group.keeper() {
            writeln!(writer, "    keep   {}", keeper.display())?;
        }
        for path in group.duplicates() {
            writeln!(writer, "    delete {}", path.display())?;
        }
        writeln!(writer)?;
    }

    let summary = &outcome.summary;
    writeln!(
        writer,
        "Scanned {} files ({}); {} duplicate group(s), {} file(s) to delete, {} reclaimable",
        summary.total_files,
        ByteSize(summary.total_size),
        outcome.groups.len(),
        outcome.plan.len(),
        ByteSize(outcome.plan.total_reclaimable_bytes)
    )?;

    if summary.has_errors() {
        writeln!(
            writer,
            "Skipped {} unreadable entr(ies) and {} unhashable file(s); run with -v for details",
            summary.scan_errors.len(),
            summary.hash_errors.len()
        )?;
    }

    Ok(())
}

/// Print the outcome of executing the deletion plan.
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn print_deletion<W: Write>(writer: &mut W, result: &BatchDeleteResult) -> io::Result<()> {
    for (path, reason) in &result.failures {
        writeln!(writer, "    failed {}: {}", path.display(), reason)?;
    }
    writeln!(writer, "{}", result.summary())
}
