//! Full run: snapshots in, sorted intervals and per-aircraft counts out.

use anyhow::{Context, Result};
use sepwatch_core::{
    bucket_snapshots, count_per_aircraft, observed_callsigns, partition_batches, sort_by_start,
    totals, AircraftConflictCounts, ConflictInterval, ConflictTotals, ConflictTracker, Snapshot,
    TrackerStats,
};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::loader::MILLIS_PER_SEC;
use crate::output::{display_epoch, write_conflicts, write_counts};
use crate::progress::BatchProgress;

/// Result of one pass.
#[derive(Debug)]
pub struct Report {
    /// Sorted by start time, timestamps in epoch milliseconds
    pub intervals: Vec<ConflictInterval<i64>>,
    pub counts: Vec<AircraftConflictCounts>,
    pub totals: ConflictTotals,
    pub stats: TrackerStats,
}

pub fn analyze(mut snapshots: Vec<Snapshot<i64>>, config: &Config) -> Result<Report> {
    bucket_snapshots(&mut snapshots, i64::from(config.bucket_secs) * MILLIS_PER_SEC);
    let batches = partition_batches(snapshots);
    let callsigns = observed_callsigns(batches.iter().flat_map(|batch| batch.snapshots.iter()));
    tracing::info!(
        batches = batches.len(),
        aircraft = callsigns.len(),
        bucket_secs = config.bucket_secs,
        "Checking conflicts"
    );

    let progress = BatchProgress::new(batches.len() as u64, config.show_progress);
    let mut tracker = ConflictTracker::new(config.tracker.clone());
    for batch in &batches {
        tracker
            .process_batch(batch)
            .with_context(|| format!("aborted at snapshot time {}", display_epoch(batch.timestamp)))?;
        progress.inc();
    }
    progress.finish();

    let stats = tracker.stats();
    let mut intervals = tracker.finish();
    sort_by_start(&mut intervals);
    let counts = count_per_aircraft(&callsigns, &intervals);
    let totals = totals(&intervals);

    Ok(Report {
        intervals,
        counts,
        totals,
        stats,
    })
}

/// Write both output files, or neither.
///
/// Each file is written next to its destination under a `.tmp` name and
/// renamed into place only after both writes succeed.
pub fn write_report(report: &Report, config: &Config) -> Result<()> {
    let conflicts_tmp = staging_path(&config.conflicts_out);
    let counts_tmp = staging_path(&config.counts_out);

    let written = write_staged(report, config, &conflicts_tmp, &counts_tmp);
    if written.is_err() {
        for path in [&conflicts_tmp, &counts_tmp] {
            let _ = fs::remove_file(path);
        }
        return written;
    }

    fs::rename(&conflicts_tmp, &config.conflicts_out)
        .with_context(|| format!("failed to move output to {}", config.conflicts_out.display()))?;
    fs::rename(&counts_tmp, &config.counts_out)
        .with_context(|| format!("failed to move output to {}", config.counts_out.display()))?;

    tracing::info!(
        conflicts = %config.conflicts_out.display(),
        counts = %config.counts_out.display(),
        "Wrote results"
    );
    Ok(())
}

fn write_staged(report: &Report, config: &Config, conflicts_tmp: &Path, counts_tmp: &Path) -> Result<()> {
    let conflicts = create(conflicts_tmp)?;
    write_conflicts(conflicts, &report.intervals, config.format, config.time_format)
        .with_context(|| format!("failed to write {}", config.conflicts_out.display()))?;

    let counts = create(counts_tmp)?;
    write_counts(counts, &report.counts, config.format)
        .with_context(|| format!("failed to write {}", config.counts_out.display()))?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
