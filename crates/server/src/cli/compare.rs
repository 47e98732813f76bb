//! Compare command - diff the two most recent snapshots.

use anyhow::{Context, Result};

use cinerank_core::{compare_snapshots, Comparison, Config, DiffError, SnapshotStore};

/// Execute the compare command.
pub fn execute(config: &Config) -> Result<()> {
    println!("Comparing latest data with previous version...");
    let store = SnapshotStore::new(&config.data.dir);

    let comparison = match compare_snapshots(&store, None, None) {
        Ok(comparison) => comparison,
        Err(DiffError::NotEnoughSnapshots) => {
            println!("Not enough historical data for comparison. Need at least 2 versions.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    store
        .save_comparison_report(&comparison.changes, None)
        .context("Failed to save comparison report")?;

    print!("{}", render_summary(&comparison));
    Ok(())
}

fn render_summary(comparison: &Comparison) -> String {
    let summary = &comparison.summary;
    format!(
        "Comparison between {} and {}:\n  Added: {}\n  Removed: {}\n  Moved up: {}\n  Moved down: {}\n  Unchanged: {}\n",
        comparison.previous_timestamp,
        comparison.latest_timestamp,
        summary.total_added,
        summary.total_removed,
        summary.total_moved_up,
        summary.total_moved_down,
        summary.total_unchanged,
    )
}
