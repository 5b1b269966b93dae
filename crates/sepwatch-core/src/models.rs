//! Core data models for separation conflict tracking.

use serde::Serialize;
use std::fmt;

/// Anything usable as a snapshot timestamp.
///
/// Only a total order is required; spacing between timestamps is irrelevant.
pub trait Timestamp: Ord + Clone + fmt::Debug + Send + Sync {}

impl<T> Timestamp for T where T: Ord + Clone + fmt::Debug + Send + Sync {}

/// One aircraft observation at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub timestamp: T,
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    /// Barometric altitude, same unit for every snapshot in a stream
    pub baro_altitude: f64,
}

impl<T> Snapshot<T> {
    pub fn new(
        timestamp: T,
        callsign: impl Into<String>,
        lat: f64,
        lon: f64,
        baro_altitude: f64,
    ) -> Self {
        Self {
            timestamp,
            callsign: callsign.into(),
            lat,
            lon,
            baro_altitude,
        }
    }
}

/// All snapshots sharing one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotBatch<T> {
    pub timestamp: T,
    pub snapshots: Vec<Snapshot<T>>,
}

impl<T> SnapshotBatch<T> {
    pub fn new(timestamp: T) -> Self {
        Self {
            timestamp,
            snapshots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Unordered pair of aircraft, stored in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Build the canonical key for two distinct callsigns.
    pub fn new(a: &str, b: &str) -> Self {
        debug_assert_ne!(a, b, "a pair needs two distinct aircraft");
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// Separation loss classification of a pair at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ConflictKind {
    /// Horizontal separation lost, vertical separation kept
    Horizontal,
    /// Vertical separation lost, horizontal separation kept
    Vertical,
    /// Both separations lost
    Combined,
}

impl ConflictKind {
    pub const ALL: [ConflictKind; 3] = [
        ConflictKind::Horizontal,
        ConflictKind::Vertical,
        ConflictKind::Combined,
    ];

    /// Whether a pair with the given loss flags falls under this kind.
    pub fn matches(self, horizontal: bool, vertical: bool) -> bool {
        match self {
            ConflictKind::Horizontal => horizontal && !vertical,
            ConflictKind::Vertical => vertical && !horizontal,
            ConflictKind::Combined => horizontal && vertical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::Horizontal => "Horizontal",
            ConflictKind::Vertical => "Vertical",
            ConflictKind::Combined => "Combined",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed conflict period for one pair and one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictInterval<T> {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub callsign1: String,
    pub callsign2: String,
    pub start_time: T,
    pub end_time: T,
}

impl<T> ConflictInterval<T> {
    pub fn new(kind: ConflictKind, pair: &PairKey, start_time: T, end_time: T) -> Self {
        Self {
            kind,
            callsign1: pair.first().to_string(),
            callsign2: pair.second().to_string(),
            start_time,
            end_time,
        }
    }

    pub fn pair(&self) -> PairKey {
        PairKey::new(&self.callsign1, &self.callsign2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(PairKey::new("UAL12", "DAL7"), PairKey::new("DAL7", "UAL12"));
        let key = PairKey::new("UAL12", "DAL7");
        assert_eq!(key.first(), "DAL7");
        assert_eq!(key.second(), "UAL12");
    }

    #[test]
    fn test_kinds_are_mutually_exclusive() {
        for (hor, ver) in [(false, false), (true, false), (false, true), (true, true)] {
            let matching = ConflictKind::ALL
                .iter()
                .filter(|kind| kind.matches(hor, ver))
                .count();
            let expected = usize::from(hor || ver);
            assert_eq!(matching, expected, "hor={hor} ver={ver}");
        }
    }

    #[test]
    fn test_interval_serializes_with_output_column_names() {
        let interval = ConflictInterval::new(ConflictKind::Combined, &PairKey::new("B", "A"), 10, 20);
        let value = serde_json::to_value(&interval).unwrap();
        assert_eq!(value["type"], "Combined");
        assert_eq!(value["callsign1"], "A");
        assert_eq!(value["callsign2"], "B");
        assert_eq!(value["start_time"], 10);
        assert_eq!(value["end_time"], 20);
    }
}
