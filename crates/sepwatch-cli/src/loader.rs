//! CSV snapshot loader.
//!
//! Reads surveillance snapshots with one row per aircraft report and
//! validates every row before it reaches the tracker.

use chrono::{DateTime, NaiveDateTime};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use sepwatch_core::Snapshot;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Loaded timestamps are epoch milliseconds.
pub const MILLIS_PER_SEC: i64 = 1000;

/// Column names of the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSchema {
    pub time: String,
    pub callsign: String,
    pub lat: String,
    pub lon: String,
    pub altitude: String,
}

impl Default for CsvSchema {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            callsign: "callsign".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
            altitude: "baroaltitude".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV header")]
    Header(#[source] csv::Error),

    #[error("input has no `{0}` column")]
    MissingColumn(String),

    #[error("line {line} is malformed")]
    Record {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line} (time {time}): missing `{field}`")]
    MissingField {
        line: u64,
        time: String,
        field: String,
    },

    #[error("line {line} (time {time}): invalid `{field}` value {value:?}")]
    InvalidField {
        line: u64,
        time: String,
        field: String,
        value: String,
    },
}

struct Columns {
    time: usize,
    callsign: usize,
    lat: usize,
    lon: usize,
    altitude: usize,
}

impl Columns {
    fn locate(headers: &StringRecord, schema: &CsvSchema) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            time: find(&schema.time)?,
            callsign: find(&schema.callsign)?,
            lat: find(&schema.lat)?,
            lon: find(&schema.lon)?,
            altitude: find(&schema.altitude)?,
        })
    }
}

/// Load snapshots from a CSV file.
pub fn load_snapshots_from_path(
    path: &Path,
    schema: &CsvSchema,
    skip_incomplete: bool,
) -> Result<Vec<Snapshot<i64>>, LoadError> {
    let reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    read_records(reader, schema, skip_incomplete)
}

/// Load snapshots from any CSV source.
///
/// With `skip_incomplete`, rows missing a required field are dropped instead
/// of failing the load. Values that are present but invalid always fail.
pub fn load_snapshots<R: io::Read>(
    source: R,
    schema: &CsvSchema,
    skip_incomplete: bool,
) -> Result<Vec<Snapshot<i64>>, LoadError> {
    let reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);
    read_records(reader, schema, skip_incomplete)
}

fn read_records<R: io::Read>(
    mut reader: Reader<R>,
    schema: &CsvSchema,
    skip_incomplete: bool,
) -> Result<Vec<Snapshot<i64>>, LoadError> {
    let headers = reader.headers().map_err(LoadError::Header)?.clone();
    let columns = Columns::locate(&headers, schema)?;

    let mut snapshots = Vec::new();
    let mut skipped = 0usize;
    for (idx, record) in reader.records().enumerate() {
        // Header is line 1
        let fallback_line = idx as u64 + 2;
        let record = record.map_err(|source| LoadError::Record {
            line: source.position().map(|p| p.line()).unwrap_or(fallback_line),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        match parse_record(&record, line, &columns, schema) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(LoadError::MissingField { .. }) if skip_incomplete => skipped += 1,
            Err(err) => return Err(err),
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Dropped incomplete snapshot rows");
    }
    tracing::debug!(snapshots = snapshots.len(), "Loaded snapshots");
    Ok(snapshots)
}

fn parse_record(
    record: &StringRecord,
    line: u64,
    columns: &Columns,
    schema: &CsvSchema,
) -> Result<Snapshot<i64>, LoadError> {
    let field = |idx: usize| record.get(idx).filter(|raw| !is_missing(raw));
    let time_label = field(columns.time).unwrap_or("?").to_string();

    let missing = |name: &str| LoadError::MissingField {
        line,
        time: time_label.clone(),
        field: name.to_string(),
    };
    let invalid = |name: &str, raw: &str| LoadError::InvalidField {
        line,
        time: time_label.clone(),
        field: name.to_string(),
        value: raw.to_string(),
    };

    let raw_time = field(columns.time).ok_or_else(|| missing(&schema.time))?;
    let timestamp = parse_time(raw_time).ok_or_else(|| invalid(&schema.time, raw_time))?;

    let callsign = field(columns.callsign).ok_or_else(|| missing(&schema.callsign))?;

    let coordinate = |idx: usize, name: &str, limit: f64| -> Result<f64, LoadError> {
        let raw = field(idx).ok_or_else(|| missing(name))?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && value.abs() <= limit)
            .ok_or_else(|| invalid(name, raw))
    };
    let lat = coordinate(columns.lat, &schema.lat, 90.0)?;
    let lon = coordinate(columns.lon, &schema.lon, 180.0)?;
    let altitude = coordinate(columns.altitude, &schema.altitude, f64::MAX)?;

    Ok(Snapshot::new(timestamp, callsign, lat, lon, altitude))
}

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null")
}

/// Parse a timestamp as epoch milliseconds.
///
/// Accepts integer or fractional epoch seconds, RFC 3339, and
/// `YYYY-MM-DD HH:MM:SS` taken as UTC. Fractions finer than a millisecond are
/// rounded. Values outside the `i64` millisecond range are rejected.
pub fn parse_time(raw: &str) -> Option<i64> {
    if let Ok(secs) = raw.parse::<i64>() {
        return secs.checked_mul(MILLIS_PER_SEC);
    }
    if let Ok(secs) = raw.parse::<f64>() {
        let millis = (secs * MILLIS_PER_SEC as f64).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        let in_range = millis >= i64::MIN as f64 && millis < i64::MAX as f64;
        return (millis.is_finite() && in_range).then_some(millis as i64);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}
