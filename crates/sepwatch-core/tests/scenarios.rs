//! End-to-end conflict interval scenarios.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sepwatch_core::{
    detect_conflicts, partition_batches, AbsencePolicy, ConflictInterval, ConflictKind,
    ConflictTracker, PairKey, Snapshot, TrackerConfig, EARTH_RADIUS_NM,
};
use std::collections::HashMap;

/// Longitude offset at the equator for a given distance in NM.
fn lon_for_nm(nm: f64) -> f64 {
    nm / (EARTH_RADIUS_NM * std::f64::consts::PI / 180.0)
}

/// Two aircraft on the equator, `nm` apart east-west, `alt_diff` apart vertically.
fn pair_at(t: i64, nm: f64, alt_diff: f64) -> Vec<Snapshot<i64>> {
    vec![
        Snapshot::new(t, "A", 0.0, 0.0, 10_000.0),
        Snapshot::new(t, "B", 0.0, lon_for_nm(nm), 10_000.0 + alt_diff),
    ]
}

fn run(snapshots: Vec<Snapshot<i64>>) -> Vec<ConflictInterval<i64>> {
    detect_conflicts(snapshots, TrackerConfig::default()).unwrap()
}

fn summary(intervals: &[ConflictInterval<i64>]) -> Vec<(ConflictKind, String, String, i64, i64)> {
    let mut rows: Vec<_> = intervals
        .iter()
        .map(|i| (i.kind, i.callsign1.clone(), i.callsign2.clone(), i.start_time, i.end_time))
        .collect();
    rows.sort();
    rows
}

#[test]
fn test_horizontal_conflict_closes_when_aircraft_separate() {
    let mut snapshots = Vec::new();
    for t in 1..=3 {
        snapshots.extend(pair_at(t, 2.0, 1200.0));
    }
    snapshots.extend(pair_at(4, 10.0, 1200.0));

    let intervals = run(snapshots);
    assert_eq!(
        summary(&intervals),
        vec![(ConflictKind::Horizontal, "A".into(), "B".into(), 1, 4)]
    );
}

#[test]
fn test_vertical_conflict_closes_when_pair_no_longer_co_present() {
    let mut snapshots = Vec::new();
    for t in 1..=2 {
        snapshots.extend(pair_at(t, 10.0, 500.0));
    }
    snapshots.push(Snapshot::new(3, "A", 0.0, 0.0, 10_000.0));
    snapshots.push(Snapshot::new(3, "C", 0.0, lon_for_nm(80.0), 30_000.0));

    let intervals = run(snapshots);
    assert_eq!(
        summary(&intervals),
        vec![(ConflictKind::Vertical, "A".into(), "B".into(), 1, 3)]
    );
}

#[test]
fn test_combined_conflict_open_at_stream_end_closes_at_last_timestamp() {
    let mut snapshots = Vec::new();
    for t in 1..=5 {
        snapshots.extend(pair_at(t, 1.0, 100.0));
    }

    let intervals = run(snapshots);
    assert_eq!(
        summary(&intervals),
        vec![(ConflictKind::Combined, "A".into(), "B".into(), 1, 5)]
    );
}

#[test]
fn test_well_separated_traffic_produces_nothing() {
    let mut snapshots = Vec::new();
    for t in 1..=4 {
        snapshots.push(Snapshot::new(t, "A", 0.0, 0.0, 10_000.0));
        snapshots.push(Snapshot::new(t, "B", 0.0, lon_for_nm(20.0), 12_000.0));
        snapshots.push(Snapshot::new(t, "C", 0.5, lon_for_nm(40.0), 14_000.0));
    }

    assert!(run(snapshots).is_empty());
}

#[test]
fn test_horizontal_becomes_combined_when_altitude_closes() {
    let mut snapshots = pair_at(1, 1.0, 1500.0);
    snapshots.extend(pair_at(2, 1.0, 200.0));

    let intervals = run(snapshots);
    assert_eq!(
        summary(&intervals),
        vec![
            (ConflictKind::Horizontal, "A".into(), "B".into(), 1, 2),
            (ConflictKind::Combined, "A".into(), "B".into(), 2, 2),
        ]
    );
}

#[test]
fn test_reversed_callsign_order_maps_to_same_pair() {
    let snapshots = vec![
        Snapshot::new(1, "ZED", 0.0, 0.0, 0.0),
        Snapshot::new(1, "ALPHA", 0.0, lon_for_nm(1.0), 0.0),
        Snapshot::new(2, "ALPHA", 0.0, lon_for_nm(1.0), 0.0),
        Snapshot::new(2, "ZED", 0.0, 0.0, 0.0),
    ];

    let intervals = run(snapshots);
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].callsign1, "ALPHA");
    assert_eq!(intervals[0].callsign2, "ZED");
}

/// Irregularly spaced traffic with aircraft dropping in and out.
fn random_traffic(seed: u64) -> Vec<Snapshot<i64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let callsigns = ["AAL1", "BAW2", "DLH3", "KLM4", "SWR5", "UAE6", "QFA7"];
    let mut snapshots = Vec::new();
    let mut t = 1_700_000_000_i64;

    for _ in 0..60 {
        t += rng.random_range(1..30);
        for callsign in callsigns {
            if rng.random_bool(0.8) {
                snapshots.push(Snapshot::new(
                    t,
                    callsign,
                    rng.random_range(0.0..0.08),
                    rng.random_range(0.0..0.08),
                    rng.random_range(9_000.0..11_500.0),
                ));
            }
        }
    }
    snapshots
}

fn assert_interval_invariants(intervals: &[ConflictInterval<i64>], last: i64) {
    let mut per_key: HashMap<(PairKey, ConflictKind), Vec<(i64, i64)>> = HashMap::new();
    for interval in intervals {
        assert!(interval.end_time >= interval.start_time, "{interval:?}");
        assert!(interval.end_time <= last, "{interval:?}");
        assert!(interval.callsign1 < interval.callsign2, "{interval:?}");
        per_key
            .entry((interval.pair(), interval.kind))
            .or_default()
            .push((interval.start_time, interval.end_time));
    }

    for (key, mut spans) in per_key {
        spans.sort();
        for window in spans.windows(2) {
            assert!(window[1].0 > window[0].1, "overlap for {key:?}: {spans:?}");
        }
    }
}

#[test]
fn test_random_traffic_invariants_hold_under_both_policies() {
    for seed in [1, 7, 42] {
        let snapshots = random_traffic(seed);
        let last = snapshots.iter().map(|s| s.timestamp).max().unwrap();

        for policy in [AbsencePolicy::Close, AbsencePolicy::Retain] {
            let config = TrackerConfig::default().with_absence_policy(policy);
            let intervals = detect_conflicts(snapshots.clone(), config).unwrap();
            assert!(!intervals.is_empty(), "seed {seed} produced no conflicts");
            assert_interval_invariants(&intervals, last);
        }
    }
}

#[test]
fn test_at_most_one_kind_open_per_pair() {
    let snapshots = random_traffic(3);
    let callsigns: Vec<String> = sepwatch_core::observed_callsigns(&snapshots);
    let mut tracker = ConflictTracker::new(TrackerConfig::default());

    for batch in partition_batches(snapshots) {
        tracker.process_batch(&batch).unwrap();
        for (i, a) in callsigns.iter().enumerate() {
            for b in &callsigns[i + 1..] {
                let pair = PairKey::new(a, b);
                let open = ConflictKind::ALL
                    .iter()
                    .filter(|kind| tracker.open_since(**kind, &pair).is_some())
                    .count();
                assert!(open <= 1, "{pair} open under {open} kinds at {}", batch.timestamp);
            }
        }
    }
}

#[test]
fn test_rerun_is_idempotent() {
    let snapshots = random_traffic(11);
    let first = run(snapshots.clone());
    let second = run(snapshots);
    assert_eq!(summary(&first), summary(&second));
}

#[test]
fn test_still_open_intervals_end_at_global_maximum() {
    let mut snapshots = pair_at(10, 1.0, 0.0);
    snapshots.extend(pair_at(20, 1.0, 0.0));
    // Only A reports last; under Retain the pair stays open until the stream ends.
    snapshots.push(Snapshot::new(35, "A", 0.0, 0.0, 10_000.0));

    let config = TrackerConfig::default().with_absence_policy(AbsencePolicy::Retain);
    let intervals = detect_conflicts(snapshots, config).unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].end_time, 35);
}
