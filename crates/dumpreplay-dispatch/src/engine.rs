//! `ReplayEngine` — decoder task plus the rate-governed dispatch loop.

use std::io::Read;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use dumpreplay_core::{
    ArchiveError, RatePolicy, Record, RecordSink, ReplayError, ReplayOutcome, ReplayReport,
};
use dumpreplay_decoder::ArchiveReader;

use crate::config::ReplayConfig;
use crate::limiter::TokenBucket;

/// Live counters for a run, queryable while it is in progress.
#[derive(Debug, Clone, Default)]
pub struct ReplayMetrics {
    pub records_decoded: u64,
    pub markers_skipped: u64,
    pub decode_errors: u64,
    pub records_applied: u64,
}

/// The top-level replay engine.
///
/// Owns the run configuration, a shared sink handle, and the metrics
/// snapshot. One call to [`run`](Self::run) performs one complete decode
/// pass over the archive.
pub struct ReplayEngine {
    config: ReplayConfig,
    sink: Arc<dyn RecordSink>,
    metrics: Arc<Mutex<ReplayMetrics>>,
}

impl ReplayEngine {
    pub fn new(config: ReplayConfig, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            config,
            sink,
            metrics: Arc::new(Mutex::new(ReplayMetrics::default())),
        }
    }

    /// Snapshot of the current metrics.
    pub fn metrics(&self) -> ReplayMetrics {
        self.metrics.lock().unwrap().clone()
    }

    /// Replay the configured archive into the sink.
    ///
    /// Spawns the decoder on a blocking task feeding a bounded channel, runs
    /// the dispatch loop on the consumer side, and joins the decoder before
    /// returning. `cancel` stops both sides within one suspension point; an
    /// in-flight sink call is allowed to complete.
    pub async fn run(&self, cancel: CancellationToken) -> Result<ReplayReport, ReplayError> {
        let policy = self.config.policy()?;
        let reader = ArchiveReader::open(&self.config.source_path)?;
        info!(
            source = %self.config.source_path.display(),
            rate = policy.sustained_rate,
            burst = policy.burst_size,
            sink = self.sink.name(),
            "starting replay"
        );

        let (tx, rx) = mpsc::channel(self.config.buffer_capacity);

        let producer_cancel = cancel.clone();
        let producer_metrics = Arc::clone(&self.metrics);
        let producer = tokio::task::spawn_blocking(move || {
            read_archive(reader, tx, producer_cancel, producer_metrics);
        });

        let result = dispatch(
            rx,
            policy,
            Arc::clone(&self.sink),
            cancel,
            Arc::clone(&self.metrics),
        )
        .await;

        // The dispatch side has returned (and on early exit dropped its
        // receiver), so the decoder unblocks and stops promptly.
        let _ = producer.await;

        match result {
            Ok(mut report) => {
                let m = self.metrics.lock().unwrap();
                report.records_decoded = m.records_decoded;
                report.markers_skipped = m.markers_skipped;
                report.decode_errors = m.decode_errors;
                drop(m);
                info!(
                    applied = report.records_applied,
                    decoded = report.records_decoded,
                    outcome = %report.outcome,
                    "replay finished"
                );
                Ok(report)
            }
            Err(err) => {
                let applied = self.metrics.lock().unwrap().records_applied;
                error!(applied, error = %err, "replay aborted");
                Err(err)
            }
        }
    }
}

/// Decoder side of the pipeline. Runs on a blocking task; `blocking_send`
/// on the bounded channel is the backpressure point. A fatal decode error
/// travels through the channel so the dispatch side surfaces it.
fn read_archive<R: Read>(
    mut reader: ArchiveReader<R>,
    tx: mpsc::Sender<Result<Record, ArchiveError>>,
    cancel: CancellationToken,
    metrics: Arc<Mutex<ReplayMetrics>>,
) {
    loop {
        if cancel.is_cancelled() {
            debug!("decoder observed cancellation");
            break;
        }
        match reader.next_record() {
            Ok(Some(record)) => {
                // A closed channel means the dispatcher is gone; stop reading.
                if tx.blocking_send(Ok(record)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                let _ = tx.blocking_send(Err(err));
                break;
            }
        }
        flush_stats(&reader, &metrics);
    }
    flush_stats(&reader, &metrics);
    // Dropping the reader here releases the archive handle on every path.
}

fn flush_stats<R: std::io::Read>(reader: &ArchiveReader<R>, metrics: &Mutex<ReplayMetrics>) {
    let stats = reader.stats();
    let mut m = metrics.lock().unwrap();
    m.records_decoded = stats.records_decoded;
    m.markers_skipped = stats.markers_skipped;
    m.decode_errors = stats.decode_errors;
}

/// The rate-governed dispatch loop.
///
/// Pulls records off the channel in arrival order, charges one token per
/// record (cooperatively sleeping until one accrues), and forwards each to
/// the sink — one in-flight call at a time. The first sink failure aborts
/// the run; cancellation is observed at every channel- and token-wait.
pub async fn dispatch(
    mut rx: mpsc::Receiver<Result<Record, ArchiveError>>,
    policy: RatePolicy,
    sink: Arc<dyn RecordSink>,
    cancel: CancellationToken,
    metrics: Arc<Mutex<ReplayMetrics>>,
) -> Result<ReplayReport, ReplayError> {
    let mut bucket = TokenBucket::new(&policy);
    let mut applied: u64 = 0;

    let outcome = 'run: loop {
        // Biased so a pending cancellation always wins over more input.
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break 'run ReplayOutcome::Cancelled,
            next = rx.recv() => next,
        };

        let record = match next {
            Some(Ok(record)) => record,
            Some(Err(err)) => return Err(err.into()),
            None => break 'run ReplayOutcome::Completed,
        };

        while !bucket.try_acquire() {
            let wait = bucket.wait_time();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'run ReplayOutcome::Cancelled,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        if let Err(source) = sink.apply(&record).await {
            warn!(
                sink = sink.name(),
                index = applied + 1,
                error = %source,
                "sink rejected record"
            );
            return Err(ReplayError::Sink {
                index: applied + 1,
                source,
            });
        }

        applied += 1;
        metrics.lock().unwrap().records_applied = applied;
        debug!(applied, bytes = record.encoded_len(), "record applied");
    };

    let m = metrics.lock().unwrap();
    Ok(ReplayReport {
        records_applied: applied,
        records_decoded: m.records_decoded,
        markers_skipped: m.markers_skipped,
        decode_errors: m.decode_errors,
        outcome,
    })
}
