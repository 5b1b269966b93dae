//! Separation minima and tracker behaviour settings.

/// Minimum horizontal separation in nautical miles.
pub const HORIZONTAL_SEPARATION_NM: f64 = 3.0;

/// Minimum vertical separation, in the altitude unit of the input.
pub const VERTICAL_SEPARATION: f64 = 1000.0;

/// Batches with at least this many aircraft evaluate pairs on the rayon pool.
pub const DEFAULT_PARALLEL_MIN_AIRCRAFT: usize = 64;

/// What happens to an open interval whose pair is missing from a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AbsencePolicy {
    /// Close at the timestamp of the first batch that does not contain the pair
    #[default]
    Close,
    /// Keep open until the pair is evaluated again or the stream ends
    Retain,
}

/// Configuration for a conflict tracking pass.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub absence_policy: AbsencePolicy,
    pub parallel_min_aircraft: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            absence_policy: AbsencePolicy::Close,
            parallel_min_aircraft: DEFAULT_PARALLEL_MIN_AIRCRAFT,
        }
    }
}

impl TrackerConfig {
    pub fn with_absence_policy(mut self, policy: AbsencePolicy) -> Self {
        self.absence_policy = policy;
        self
    }

    /// Aircraft count at which pair evaluation goes parallel. `usize::MAX` disables it.
    pub fn with_parallel_min_aircraft(mut self, min_aircraft: usize) -> Self {
        self.parallel_min_aircraft = min_aircraft.max(2);
        self
    }
}
