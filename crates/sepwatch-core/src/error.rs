use thiserror::Error;

/// Errors that abort a tracking pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("batch at {current} arrived after batch at {previous}; batches must be in timestamp order")]
    OutOfOrder { previous: String, current: String },

    #[error("snapshot for {callsign} has timestamp {found} inside the batch for {expected}")]
    MixedTimestamps {
        callsign: String,
        expected: String,
        found: String,
    },
}
