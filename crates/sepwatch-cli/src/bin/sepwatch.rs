//! sepwatch - report separation conflicts between aircraft

use anyhow::{Context, Result};
use clap::Parser;
use sepwatch_cli::{analyze, load_snapshots_from_path, write_report, Args, Config};
use sepwatch_core::ConflictKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Logs on stderr; stdout only carries the totals
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("sepwatch=info".parse()?))
        .init();

    let config = Config::from_args(Args::parse());

    tracing::info!("Loading snapshots from {}", config.input.display());
    let snapshots = load_snapshots_from_path(&config.input, &config.schema, config.skip_incomplete)
        .with_context(|| format!("failed to load {}", config.input.display()))?;

    let report = analyze(snapshots, &config)?;
    tracing::debug!(
        pairs_evaluated = report.stats.pairs_evaluated,
        intervals_opened = report.stats.intervals_opened,
        "Tracker finished"
    );
    write_report(&report, &config)?;

    for kind in ConflictKind::ALL {
        println!("Total {} Conflicts: {}", kind, report.totals.get(kind));
    }

    Ok(())
}
