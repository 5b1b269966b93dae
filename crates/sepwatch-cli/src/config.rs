//! Run configuration from command line arguments and environment.

use clap::{Parser, ValueEnum};
use sepwatch_core::{AbsencePolicy, TrackerConfig};
use std::env;
use std::path::PathBuf;

use crate::loader::CsvSchema;
use crate::output::{OutputFormat, TimeFormat};

/// What to do with an open conflict whose pair is missing from a snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AbsenceArg {
    /// Close it at the first time the pair is not reported together
    Close,
    /// Keep it open until the pair is seen together again or the data ends
    Retain,
}

impl From<AbsenceArg> for AbsencePolicy {
    fn from(arg: AbsenceArg) -> Self {
        match arg {
            AbsenceArg::Close => AbsencePolicy::Close,
            AbsenceArg::Retain => AbsencePolicy::Retain,
        }
    }
}

/// Detect separation conflicts between aircraft in surveillance snapshots
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input CSV of aircraft snapshots
    pub input: PathBuf,

    /// Where to write the conflict intervals [env: SEPWATCH_CONFLICTS_OUT]
    #[arg(long)]
    pub conflicts_out: Option<PathBuf>,

    /// Where to write the per-aircraft counts [env: SEPWATCH_COUNTS_OUT]
    #[arg(long)]
    pub counts_out: Option<PathBuf>,

    /// Output file format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Group reports into windows of this many seconds (0 = exact time match) [env: SEPWATCH_BUCKET_SECS]
    #[arg(long)]
    pub bucket_secs: Option<u32>,

    /// Handling of conflicts whose pair drops out of a snapshot time
    #[arg(long, value_enum, default_value = "close")]
    pub absence: AbsenceArg,

    /// Drop rows with missing fields instead of aborting
    #[arg(long)]
    pub skip_incomplete: bool,

    /// Render output timestamps as RFC 3339 instead of epoch seconds
    #[arg(long)]
    pub iso_times: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Name of the timestamp column
    #[arg(long, default_value = "time")]
    pub time_column: String,

    /// Name of the aircraft identifier column
    #[arg(long, default_value = "callsign")]
    pub callsign_column: String,

    /// Name of the latitude column
    #[arg(long, default_value = "lat")]
    pub lat_column: String,

    /// Name of the longitude column
    #[arg(long, default_value = "lon")]
    pub lon_column: String,

    /// Name of the altitude column
    #[arg(long, default_value = "baroaltitude")]
    pub altitude_column: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub conflicts_out: PathBuf,
    pub counts_out: PathBuf,
    pub format: OutputFormat,
    pub time_format: TimeFormat,
    pub bucket_secs: u32,
    pub skip_incomplete: bool,
    pub show_progress: bool,
    pub schema: CsvSchema,
    pub tracker: TrackerConfig,
}

impl Config {
    /// Defaults for everything but the input, with environment overrides.
    pub fn from_env(input: PathBuf, format: OutputFormat) -> Self {
        Self {
            input,
            conflicts_out: env::var("SEPWATCH_CONFLICTS_OUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(format!("conflicts_inorder.{}", format.extension()))),
            counts_out: env::var("SEPWATCH_COUNTS_OUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(format!("count_per_plane.{}", format.extension()))),
            format,
            time_format: TimeFormat::Epoch,
            bucket_secs: env::var("SEPWATCH_BUCKET_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            skip_incomplete: false,
            show_progress: true,
            schema: CsvSchema::default(),
            tracker: TrackerConfig::default(),
        }
    }

    pub fn from_args(args: Args) -> Self {
        let mut config = Self::from_env(args.input, args.format);
        if let Some(path) = args.conflicts_out {
            config.conflicts_out = path;
        }
        if let Some(path) = args.counts_out {
            config.counts_out = path;
        }
        if let Some(secs) = args.bucket_secs {
            config.bucket_secs = secs;
        }
        if args.iso_times {
            config.time_format = TimeFormat::Iso;
        }
        config.skip_incomplete = args.skip_incomplete;
        config.show_progress = !args.no_progress;
        config.schema = CsvSchema {
            time: args.time_column,
            callsign: args.callsign_column,
            lat: args.lat_column,
            lon: args.lon_column,
            altitude: args.altitude_column,
        };
        config.tracker = TrackerConfig::default().with_absence_policy(args.absence.into());
        config
    }
}
