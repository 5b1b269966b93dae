//! Writers for conflict intervals and per-aircraft counts.

use chrono::{DateTime, SecondsFormat};
use clap::ValueEnum;
use sepwatch_core::{AircraftConflictCounts, ConflictInterval, ConflictKind};
use serde::Serialize;
use std::io;
use thiserror::Error;

use crate::loader::MILLIS_PER_SEC;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// How timestamps are rendered in the conflicts output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// Epoch seconds, fractional only when the input was
    #[default]
    Epoch,
    /// RFC 3339 in UTC
    Iso,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write CSV")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TimeValue {
    Seconds(i64),
    Fractional(f64),
    Iso(String),
}

impl TimeValue {
    fn render(millis: i64, format: TimeFormat) -> Self {
        match format {
            TimeFormat::Epoch => TimeValue::epoch(millis),
            TimeFormat::Iso => match DateTime::from_timestamp_millis(millis) {
                Some(dt) => TimeValue::Iso(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                None => TimeValue::epoch(millis),
            },
        }
    }

    fn epoch(millis: i64) -> Self {
        if millis % MILLIS_PER_SEC == 0 {
            TimeValue::Seconds(millis / MILLIS_PER_SEC)
        } else {
            TimeValue::Fractional(millis as f64 / MILLIS_PER_SEC as f64)
        }
    }
}

/// Epoch milliseconds rendered as seconds, for messages.
pub fn display_epoch(millis: i64) -> String {
    match TimeValue::epoch(millis) {
        TimeValue::Seconds(secs) => secs.to_string(),
        TimeValue::Fractional(secs) => secs.to_string(),
        TimeValue::Iso(text) => text,
    }
}

#[derive(Debug, Serialize)]
struct ConflictRow<'a> {
    #[serde(rename = "type")]
    kind: ConflictKind,
    callsign1: &'a str,
    callsign2: &'a str,
    start_time: TimeValue,
    end_time: TimeValue,
}

const CONFLICT_HEADER: [&str; 5] = ["type", "callsign1", "callsign2", "start_time", "end_time"];
const COUNT_HEADER: [&str; 4] = ["callsign", "Horizontal", "Vertical", "Combined"];

/// Write intervals in the order given. Timestamps are epoch milliseconds.
pub fn write_conflicts<W: io::Write>(
    writer: W,
    intervals: &[ConflictInterval<i64>],
    format: OutputFormat,
    time_format: TimeFormat,
) -> Result<(), OutputError> {
    let rows: Vec<ConflictRow<'_>> = intervals
        .iter()
        .map(|interval| ConflictRow {
            kind: interval.kind,
            callsign1: &interval.callsign1,
            callsign2: &interval.callsign2,
            start_time: TimeValue::render(interval.start_time, time_format),
            end_time: TimeValue::render(interval.end_time, time_format),
        })
        .collect();
    write_rows(writer, &CONFLICT_HEADER, &rows, format)
}

pub fn write_counts<W: io::Write>(
    writer: W,
    counts: &[AircraftConflictCounts],
    format: OutputFormat,
) -> Result<(), OutputError> {
    write_rows(writer, &COUNT_HEADER, counts, format)
}

fn write_rows<W: io::Write, S: Serialize>(
    mut writer: W,
    header: &[&str],
    rows: &[S],
    format: OutputFormat,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Csv => {
            // Header written by hand so an empty result still gets one.
            let mut csv_writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer);
            csv_writer.write_record(header)?;
            for row in rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rows)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }
    Ok(())
}
