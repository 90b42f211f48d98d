//! Human-readable enrich report.

use std::fmt::{self, Write};

use slotsync_recon::model::DatasetStats;
use slotsync_recon::summary::RunSummary;

/// Changes listed per dataset before collapsing into "... and N more".
const MAX_CHANGES_SHOWN: usize = 20;

pub fn render(out: &mut impl Write, summary: &RunSummary, dry_run: bool) -> fmt::Result {
    writeln!(out, "\n=== ESPN Position Enrichment Report ===\n")?;

    for (label, stats) in [("Hitters", &summary.batting), ("Pitchers", &summary.pitching)] {
        render_dataset(out, label, stats)?;
    }

    if !summary.two_way.is_empty() {
        writeln!(out, "--- Two-Way Players ---")?;
        for tw in &summary.two_way {
            writeln!(out, "  {}: hitters={}, pitchers={}", tw.name, tw.batting, tw.pitching)?;
        }
        writeln!(out)?;
    }

    if dry_run {
        writeln!(out, "=== Done. Dry run, no files written. ===")
    } else {
        writeln!(out, "=== Done. Files updated. ===")
    }
}

fn render_dataset(out: &mut impl Write, label: &str, stats: &DatasetStats) -> fmt::Result {
    writeln!(out, "--- {label} ---")?;

    if let Some(reason) = &stats.skipped {
        return writeln!(out, "Skipped: {reason}\n");
    }

    writeln!(out, "Matched: {}/{}", stats.matched, stats.matched + stats.unmatched)?;
    writeln!(out, "Position changes: {}", stats.changes.len())?;
    for change in stats.changes.iter().take(MAX_CHANGES_SHOWN) {
        writeln!(out, "  {change}")?;
    }
    if stats.changes.len() > MAX_CHANGES_SHOWN {
        writeln!(out, "  ... and {} more", stats.changes.len() - MAX_CHANGES_SHOWN)?;
    }
    writeln!(out)?;

    if !stats.unmatched_players.is_empty() {
        writeln!(out, "Unmatched ({}):", stats.unmatched)?;
        for player in &stats.unmatched_players {
            writeln!(out, "  - {player}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
