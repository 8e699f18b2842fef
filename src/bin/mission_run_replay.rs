//! # Mission Run Replay
//!
//! Applies a JSON-lines file of controller status reports to the mission run
//! database, in file order, the same way live reports are applied.

use anyhow::{Context, Result};
use clap::Parser;
use mission_run_core::config::ConfigLoader;
use mission_run_core::events::StatusChangePublisher;
use mission_run_core::ingestion::{IngestOutcome, StatusEventIngestor};
use mission_run_core::logging::init_structured_logging;
use mission_run_core::persistence::{self, PgMissionRunStore};
use mission_run_core::state_machine::{ChangeCause, StatusEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "mission-run-replay")]
#[command(about = "Replay controller status reports against the mission run database")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// JSON-lines file, one status event per line
    events: PathBuf,

    /// Configuration directory (default: ./config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Apply pending migrations before replaying
    #[arg(long)]
    migrate: bool,

    /// Stop at the first line that cannot be applied
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Debug, Default)]
struct ReplaySummary {
    applied: usize,
    not_found: usize,
    rejected: usize,
}

#[derive(Debug, Default)]
struct ChangeTally {
    changes: usize,
    resets: usize,
    missed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config_dir {
        Some(dir) => ConfigLoader::load_from_directory(dir),
        None => ConfigLoader::load(),
    }
    .context("loading configuration")?;
    init_structured_logging(&config.logging);

    let pool = persistence::connect(&config.database)
        .await
        .context("connecting to the mission run database")?;
    if cli.migrate && !config.database.run_migrations {
        persistence::run_migrations(&pool)
            .await
            .context("running migrations")?;
    }

    let publisher = StatusChangePublisher::from_config(&config.events);
    let mut receiver = publisher.subscribe();
    let tally = tokio::spawn(async move {
        let mut tally = ChangeTally::default();
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    tally.changes += 1;
                    if notification.cause == ChangeCause::RecoveryReset {
                        tally.resets += 1;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed = missed, "Status change tally fell behind");
                    tally.missed += missed;
                }
                Err(RecvError::Closed) => break,
            }
        }
        tally
    });

    let ingestor = StatusEventIngestor::new(Arc::new(PgMissionRunStore::new(pool)))
        .with_publisher(publisher);
    let file = File::open(&cli.events)
        .await
        .with_context(|| format!("opening {}", cli.events.display()))?;
    let mut lines = BufReader::new(file).lines();

    let mut summary = ReplaySummary::default();
    let mut line_number = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let applied = match serde_json::from_str::<StatusEvent>(&line) {
            Ok(event) => ingestor.handle(&event).await.map_err(anyhow::Error::from),
            Err(err) => Err(anyhow::Error::from(err)),
        };

        match applied {
            Ok(IngestOutcome::Applied(_)) => summary.applied += 1,
            Ok(IngestOutcome::NotFound(_)) => summary.not_found += 1,
            Err(err) => {
                summary.rejected += 1;
                error!(line = line_number, error = %err, "Rejected status event");
                if cli.fail_fast {
                    return Err(err.context(format!("line {line_number}")));
                }
            }
        }
    }

    // Closes the channel so the tally task finishes
    drop(ingestor);
    let tally = tally.await.context("collecting status changes")?;

    info!(
        applied = summary.applied,
        not_found = summary.not_found,
        rejected = summary.rejected,
        status_changes = tally.changes,
        recovery_resets = tally.resets,
        "Replay finished"
    );
    println!(
        "applied: {}, not found: {}, rejected: {}, status changes: {}, recovery resets: {}",
        summary.applied, summary.not_found, summary.rejected, tally.changes, tally.resets
    );
    if tally.missed > 0 {
        println!("status changes not counted (channel lagged): {}", tally.missed);
    }
    Ok(())
}
