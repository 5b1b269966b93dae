//! Grouping of a snapshot stream into per-timestamp batches.

use crate::models::{Snapshot, SnapshotBatch, Timestamp};

/// Sort snapshots by timestamp and group equal timestamps into batches.
///
/// The sort is stable, so within a batch snapshots keep their input order.
pub fn partition_batches<T, I>(snapshots: I) -> Vec<SnapshotBatch<T>>
where
    T: Timestamp,
    I: IntoIterator<Item = Snapshot<T>>,
{
    let mut snapshots: Vec<Snapshot<T>> = snapshots.into_iter().collect();
    snapshots.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut batches: Vec<SnapshotBatch<T>> = Vec::new();
    for snapshot in snapshots {
        match batches.last_mut() {
            Some(batch) if batch.timestamp == snapshot.timestamp => batch.snapshots.push(snapshot),
            _ => {
                let mut batch = SnapshotBatch::new(snapshot.timestamp.clone());
                batch.snapshots.push(snapshot);
                batches.push(batch);
            }
        }
    }
    batches
}

/// Floor an integer timestamp to a multiple of `window`, in the same unit.
///
/// A window of 0 or 1 leaves the timestamp untouched. Timestamps whose bucket
/// start lies below `i64::MIN` saturate there.
pub fn bucket_timestamp(timestamp: i64, window: i64) -> i64 {
    if window <= 1 {
        return timestamp;
    }
    timestamp.saturating_sub(timestamp.rem_euclid(window))
}

/// Snap every snapshot onto its bucket so unsynchronized reports share a batch.
///
/// Snapshots are first put in order of their own timestamps, so when one
/// aircraft reports twice inside a window its latest report comes last.
pub fn bucket_snapshots(snapshots: &mut [Snapshot<i64>], window: i64) {
    if window <= 1 {
        return;
    }
    snapshots.sort_by_key(|snapshot| snapshot.timestamp);
    for snapshot in snapshots {
        snapshot.timestamp = bucket_timestamp(snapshot.timestamp, window);
    }
}
