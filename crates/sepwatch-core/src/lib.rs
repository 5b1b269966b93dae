pub mod batch;
pub mod conflict;
pub mod error;
pub mod models;
pub mod rules;
pub mod spatial;
pub mod summary;

pub use batch::{bucket_snapshots, bucket_timestamp, partition_batches};
pub use conflict::{detect_conflicts, ConflictTracker, TrackerStats};
pub use error::TrackerError;
pub use models::{ConflictInterval, ConflictKind, PairKey, Snapshot, SnapshotBatch, Timestamp};
pub use rules::{AbsencePolicy, TrackerConfig, HORIZONTAL_SEPARATION_NM, VERTICAL_SEPARATION};
pub use spatial::{evaluate, haversine_distance_nm, Position, Separation, EARTH_RADIUS_NM};
pub use summary::{
    count_per_aircraft, observed_callsigns, sort_by_start, totals, AircraftConflictCounts,
    ConflictTotals,
};
