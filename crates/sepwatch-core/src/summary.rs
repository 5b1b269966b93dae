//! Post-processing over the intervals of a pass: ordering and per-aircraft counts.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{ConflictInterval, ConflictKind, Snapshot};

/// Number of intervals of each kind an aircraft took part in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AircraftConflictCounts {
    pub callsign: String,
    #[serde(rename = "Horizontal")]
    pub horizontal: usize,
    #[serde(rename = "Vertical")]
    pub vertical: usize,
    #[serde(rename = "Combined")]
    pub combined: usize,
}

impl AircraftConflictCounts {
    fn new(callsign: &str) -> Self {
        Self {
            callsign: callsign.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, kind: ConflictKind) {
        match kind {
            ConflictKind::Horizontal => self.horizontal += 1,
            ConflictKind::Vertical => self.vertical += 1,
            ConflictKind::Combined => self.combined += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.horizontal + self.vertical + self.combined
    }
}

/// Interval totals per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConflictTotals {
    pub horizontal: usize,
    pub vertical: usize,
    pub combined: usize,
}

impl ConflictTotals {
    pub fn get(&self, kind: ConflictKind) -> usize {
        match kind {
            ConflictKind::Horizontal => self.horizontal,
            ConflictKind::Vertical => self.vertical,
            ConflictKind::Combined => self.combined,
        }
    }
}

pub fn totals<T>(intervals: &[ConflictInterval<T>]) -> ConflictTotals {
    intervals
        .iter()
        .fold(ConflictTotals::default(), |mut acc, interval| {
            match interval.kind {
                ConflictKind::Horizontal => acc.horizontal += 1,
                ConflictKind::Vertical => acc.vertical += 1,
                ConflictKind::Combined => acc.combined += 1,
            }
            acc
        })
}

/// Stable sort by start time; ties keep their emitted order.
pub fn sort_by_start<T: Ord>(intervals: &mut [ConflictInterval<T>]) {
    intervals.sort_by(|a, b| a.start_time.cmp(&b.start_time));
}

/// Distinct callsigns in order of first appearance.
pub fn observed_callsigns<'a, T: 'a>(
    snapshots: impl IntoIterator<Item = &'a Snapshot<T>>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut callsigns = Vec::new();
    for snapshot in snapshots {
        if seen.insert(snapshot.callsign.as_str()) {
            callsigns.push(snapshot.callsign.clone());
        }
    }
    callsigns
}

/// Count intervals per aircraft for every callsign in `callsigns`.
///
/// Aircraft without conflicts are reported with zero counts; intervals naming
/// an aircraft not listed are ignored.
pub fn count_per_aircraft<T>(
    callsigns: &[String],
    intervals: &[ConflictInterval<T>],
) -> Vec<AircraftConflictCounts> {
    let mut by_callsign: HashMap<&str, AircraftConflictCounts> = HashMap::new();
    for interval in intervals {
        for callsign in [interval.callsign1.as_str(), interval.callsign2.as_str()] {
            by_callsign
                .entry(callsign)
                .or_insert_with(|| AircraftConflictCounts::new(callsign))
                .record(interval.kind);
        }
    }

    let mut reported = HashSet::new();
    callsigns
        .iter()
        .filter(|callsign| reported.insert(callsign.as_str()))
        .map(|callsign| {
            by_callsign
                .remove(callsign.as_str())
                .unwrap_or_else(|| AircraftConflictCounts::new(callsign))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PairKey;

    fn interval(kind: ConflictKind, a: &str, b: &str, start: i64, end: i64) -> ConflictInterval<i64> {
        ConflictInterval::new(kind, &PairKey::new(a, b), start, end)
    }

    #[test]
    fn test_counts_include_quiet_aircraft() {
        let intervals = vec![
            interval(ConflictKind::Horizontal, "A", "B", 1, 2),
            interval(ConflictKind::Horizontal, "A", "C", 3, 4),
            interval(ConflictKind::Combined, "B", "C", 3, 9),
        ];
        let callsigns: Vec<String> = ["C", "A", "B", "D"].iter().map(|s| s.to_string()).collect();

        let counts = count_per_aircraft(&callsigns, &intervals);
        let order: Vec<&str> = counts.iter().map(|c| c.callsign.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B", "D"]);

        assert_eq!((counts[0].horizontal, counts[0].combined), (1, 1));
        assert_eq!(counts[1].horizontal, 2);
        assert_eq!(counts[1].total(), 2);
        assert_eq!(counts[3], AircraftConflictCounts::new("D"));
    }

    #[test]
    fn test_totals_and_sort() {
        let mut intervals = vec![
            interval(ConflictKind::Vertical, "A", "B", 5, 6),
            interval(ConflictKind::Horizontal, "A", "C", 1, 4),
            interval(ConflictKind::Vertical, "B", "C", 5, 9),
        ];
        sort_by_start(&mut intervals);
        let starts: Vec<i64> = intervals.iter().map(|i| i.start_time).collect();
        assert_eq!(starts, vec![1, 5, 5]);
        // Stable for equal starts
        assert_eq!(intervals[1].callsign2, "B");

        let totals = totals(&intervals);
        assert_eq!(totals.get(ConflictKind::Horizontal), 1);
        assert_eq!(totals.get(ConflictKind::Vertical), 2);
        assert_eq!(totals.get(ConflictKind::Combined), 0);
    }

    #[test]
    fn test_observed_callsigns_keeps_first_appearance() {
        let snapshots = vec![
            Snapshot::new(1, "B", 0.0, 0.0, 0.0),
            Snapshot::new(1, "A", 0.0, 0.0, 0.0),
            Snapshot::new(2, "B", 0.0, 0.0, 0.0),
        ];
        assert_eq!(observed_callsigns(&snapshots), vec!["B".to_string(), "A".to_string()]);
    }
}
