//! Conflict interval tracking across snapshot batches.
//!
//! Every unordered pair of aircraft in a batch is classified as
//! horizontal-only, vertical-only, combined, or clear. Consecutive batches
//! with the same classification coalesce into a single interval per
//! (pair, kind). Intervals still open after the last batch are closed at the
//! last observed timestamp.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::batch::partition_batches;
use crate::error::TrackerError;
use crate::models::{ConflictInterval, ConflictKind, PairKey, Snapshot, SnapshotBatch, Timestamp};
use crate::rules::{AbsencePolicy, TrackerConfig};
use crate::spatial::{evaluate, Position, Separation};

/// Start timestamps of the currently open intervals, one map per kind.
#[derive(Debug)]
struct OpenIntervals<T> {
    horizontal: HashMap<PairKey, T>,
    vertical: HashMap<PairKey, T>,
    combined: HashMap<PairKey, T>,
}

impl<T> OpenIntervals<T> {
    fn new() -> Self {
        Self {
            horizontal: HashMap::new(),
            vertical: HashMap::new(),
            combined: HashMap::new(),
        }
    }

    fn get(&self, kind: ConflictKind) -> &HashMap<PairKey, T> {
        match kind {
            ConflictKind::Horizontal => &self.horizontal,
            ConflictKind::Vertical => &self.vertical,
            ConflictKind::Combined => &self.combined,
        }
    }

    fn get_mut(&mut self, kind: ConflictKind) -> &mut HashMap<PairKey, T> {
        match kind {
            ConflictKind::Horizontal => &mut self.horizontal,
            ConflictKind::Vertical => &mut self.vertical,
            ConflictKind::Combined => &mut self.combined,
        }
    }

    fn len(&self) -> usize {
        self.horizontal.len() + self.vertical.len() + self.combined.len()
    }
}

/// Counters for a tracking pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub batches: usize,
    pub pairs_evaluated: u64,
    pub intervals_opened: u64,
    pub intervals_closed: u64,
}

/// Single-pass conflict interval tracker.
///
/// Feed batches in non-decreasing timestamp order with
/// [`process_batch`](Self::process_batch), then call
/// [`finish`](Self::finish) to close whatever is still open.
pub struct ConflictTracker<T> {
    config: TrackerConfig,
    open: OpenIntervals<T>,
    closed: Vec<ConflictInterval<T>>,
    last_timestamp: Option<T>,
    stats: TrackerStats,
}

impl<T: Timestamp> Default for ConflictTracker<T> {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl<T: Timestamp> ConflictTracker<T> {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            open: OpenIntervals::new(),
            closed: Vec::new(),
            last_timestamp: None,
            stats: TrackerStats::default(),
        }
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Number of intervals currently open across all kinds.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Start timestamp of the open interval for `pair` under `kind`, if any.
    pub fn open_since(&self, kind: ConflictKind, pair: &PairKey) -> Option<&T> {
        self.open.get(kind).get(pair)
    }

    /// Intervals closed so far.
    pub fn closed(&self) -> &[ConflictInterval<T>] {
        &self.closed
    }

    /// Evaluate one batch and update the open/close state of every pair.
    pub fn process_batch(&mut self, batch: &SnapshotBatch<T>) -> Result<(), TrackerError> {
        if let Some(previous) = &self.last_timestamp {
            if batch.timestamp < *previous {
                return Err(TrackerError::OutOfOrder {
                    previous: format!("{previous:?}"),
                    current: format!("{:?}", batch.timestamp),
                });
            }
        }
        if let Some(stray) = batch
            .snapshots
            .iter()
            .find(|snapshot| snapshot.timestamp != batch.timestamp)
        {
            return Err(TrackerError::MixedTimestamps {
                callsign: stray.callsign.clone(),
                expected: format!("{:?}", batch.timestamp),
                found: format!("{:?}", stray.timestamp),
            });
        }

        let now = &batch.timestamp;
        let members = unique_members(&batch.snapshots);
        let separations = self.evaluate_pairs(&members);
        self.stats.pairs_evaluated += separations.len() as u64;

        for (i, j, separation) in separations {
            let pair = PairKey::new(&members[i].callsign, &members[j].callsign);
            self.apply(&pair, separation, now);
        }

        if self.config.absence_policy == AbsencePolicy::Close {
            let present: HashSet<&str> = members.iter().map(|s| s.callsign.as_str()).collect();
            self.close_absent(&present, now);
        }

        self.stats.batches += 1;
        self.last_timestamp = Some(now.clone());
        Ok(())
    }

    /// Close every interval still open at the last observed timestamp and
    /// return all intervals of the pass.
    pub fn finish(mut self) -> Vec<ConflictInterval<T>> {
        if let Some(last) = self.last_timestamp.clone() {
            for kind in ConflictKind::ALL {
                let mut remaining: Vec<(PairKey, T)> = self.open.get_mut(kind).drain().collect();
                remaining.sort_by(|a, b| a.0.cmp(&b.0));
                for (pair, start) in remaining {
                    self.close(kind, &pair, start, last.clone());
                }
            }
        }

        tracing::debug!(
            batches = self.stats.batches,
            pairs_evaluated = self.stats.pairs_evaluated,
            intervals = self.closed.len(),
            "conflict tracking finished"
        );
        self.closed
    }

    fn evaluate_pairs(&self, members: &[&Snapshot<T>]) -> Vec<(usize, usize, Separation)> {
        let n = members.len();
        if n < 2 {
            return Vec::new();
        }

        let positions: Vec<Position> = members.iter().map(|s| Position::from(*s)).collect();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        let measure = |&(i, j): &(usize, usize)| (i, j, evaluate(positions[i], positions[j]));

        if n >= self.config.parallel_min_aircraft {
            pairs.par_iter().map(measure).collect()
        } else {
            pairs.iter().map(measure).collect()
        }
    }

    fn apply(&mut self, pair: &PairKey, separation: Separation, now: &T) {
        let hor = separation.horizontal_loss();
        let ver = separation.vertical_loss();

        for kind in ConflictKind::ALL {
            if kind.matches(hor, ver) {
                let open = self.open.get_mut(kind);
                if !open.contains_key(pair) {
                    tracing::trace!(%pair, %kind, start = ?now, "conflict opened");
                    open.insert(pair.clone(), now.clone());
                    self.stats.intervals_opened += 1;
                }
            } else if let Some(start) = self.open.get_mut(kind).remove(pair) {
                self.close(kind, pair, start, now.clone());
            }
        }
    }

    fn close_absent(&mut self, present: &HashSet<&str>, now: &T) {
        for kind in ConflictKind::ALL {
            let mut absent: Vec<PairKey> = self
                .open
                .get(kind)
                .keys()
                .filter(|pair| !(present.contains(pair.first()) && present.contains(pair.second())))
                .cloned()
                .collect();
            absent.sort();

            for pair in absent {
                if let Some(start) = self.open.get_mut(kind).remove(&pair) {
                    self.close(kind, &pair, start, now.clone());
                }
            }
        }
    }

    fn close(&mut self, kind: ConflictKind, pair: &PairKey, start: T, end: T) {
        tracing::trace!(%pair, %kind, start = ?start, end = ?end, "conflict closed");
        self.closed.push(ConflictInterval::new(kind, pair, start, end));
        self.stats.intervals_closed += 1;
    }
}

/// One snapshot per aircraft, the last one read winning, sorted by callsign.
fn unique_members<T>(snapshots: &[Snapshot<T>]) -> Vec<&Snapshot<T>> {
    let mut latest: HashMap<&str, &Snapshot<T>> = HashMap::with_capacity(snapshots.len());
    for snapshot in snapshots {
        latest.insert(snapshot.callsign.as_str(), snapshot);
    }
    if latest.len() < snapshots.len() {
        tracing::debug!(
            duplicates = snapshots.len() - latest.len(),
            "duplicate callsigns in batch, keeping last report"
        );
    }

    let mut members: Vec<&Snapshot<T>> = latest.into_values().collect();
    members.sort_by(|a, b| a.callsign.cmp(&b.callsign));
    members
}

/// Run a full pass over an unordered snapshot stream.
pub fn detect_conflicts<T, I>(
    snapshots: I,
    config: TrackerConfig,
) -> Result<Vec<ConflictInterval<T>>, TrackerError>
where
    T: Timestamp,
    I: IntoIterator<Item = Snapshot<T>>,
{
    let mut tracker = ConflictTracker::new(config);
    for batch in partition_batches(snapshots) {
        tracker.process_batch(&batch)?;
    }
    Ok(tracker.finish())
}
