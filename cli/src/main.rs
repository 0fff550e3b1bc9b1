//! DumpReplay CLI — replay a length-prefixed BSON archive into a document
//! sink at a bounded rate.
//!
//! ```text
//! dumpreplay <archive> --out replayed.jsonl --rate 2 --burst 1
//! dumpreplay <archive> --dry-run --rate 500 --burst 50
//! dumpreplay <archive> --out replayed.jsonl --limit-secs 60
//! ```
//!
//! ENVIRONMENT VARIABLES:
//!   RUST_LOG    tracing filter, e.g. `info,dumpreplay_dispatch=debug`

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use dumpreplay_core::RecordSink;
use dumpreplay_dispatch::{ReplayConfig, ReplayEngine};
use dumpreplay_sink::{JsonLinesSink, NullSink};

#[derive(Parser)]
#[command(
    name = "dumpreplay",
    about = "Replay a length-prefixed BSON archive into a document sink at a bounded rate",
    version
)]
struct Cli {
    /// Path to the archive file
    archive: PathBuf,

    /// Steady admission rate, records per second
    #[arg(long, default_value_t = 2.0)]
    rate: f64,

    /// Maximum instantaneous burst, records
    #[arg(long, default_value_t = 1)]
    burst: u32,

    /// Bounded-buffer capacity between decoder and dispatcher
    #[arg(long, default_value_t = 1024)]
    buffer: usize,

    /// Write applied documents to this JSON-lines file
    #[arg(long, conflicts_with = "dry_run")]
    out: Option<PathBuf>,

    /// Decode and pace records without writing them anywhere durable
    #[arg(long)]
    dry_run: bool,

    /// Cancel the run after this many seconds
    #[arg(long)]
    limit_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Dry runs discard records; a buffering sink here would grow with the
    // archive and break the pipeline's bounded-memory property.
    let sink: Arc<dyn RecordSink> = if cli.dry_run {
        Arc::new(NullSink::new())
    } else if let Some(path) = &cli.out {
        Arc::new(
            JsonLinesSink::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        )
    } else {
        bail!("choose a destination: --out <file> or --dry-run");
    };

    let mut config = ReplayConfig::new(&cli.archive);
    config.sustained_rate = cli.rate;
    config.burst_size = cli.burst;
    config.buffer_capacity = cli.buffer;

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, stopping");
                cancel.cancel();
            }
        });
    }

    // A run deadline is just an external cancellation trigger.
    if let Some(secs) = cli.limit_secs {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::info!(secs, "time limit reached, stopping");
            cancel.cancel();
        });
    }

    let engine = ReplayEngine::new(config, sink);
    let report = engine
        .run(cancel)
        .await
        .with_context(|| format!("replaying {}", cli.archive.display()))?;

    println!(
        "{}: {} applied, {} decoded, {} markers skipped, {} undecodable dropped",
        report.outcome,
        report.records_applied,
        report.records_decoded,
        report.markers_skipped,
        report.decode_errors,
    );
    Ok(())
}
