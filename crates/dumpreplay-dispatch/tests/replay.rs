//! End-to-end pipeline tests: archive file → decoder task → dispatch → sink.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bson::doc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use dumpreplay_core::{Record, RecordSink, ReplayError, ReplayOutcome, SinkError};
use dumpreplay_core::ArchiveError;
use dumpreplay_dispatch::{ReplayConfig, ReplayEngine};
use dumpreplay_sink::MemorySink;

const MAGIC: [u8; 4] = [0x6d, 0xe2, 0x99, 0x81];

fn write_archive(dir: &TempDir, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join("dump");
    std::fs::write(&path, bytes).unwrap();
    path
}

fn fast_config(path: PathBuf) -> ReplayConfig {
    let mut config = ReplayConfig::new(path);
    config.sustained_rate = 10_000.0;
    config.burst_size = 64;
    // Small buffer so the decoder actually hits backpressure.
    config.buffer_capacity = 8;
    config
}

#[tokio::test]
async fn replays_whole_archive_in_order() {
    let mut bytes = MAGIC.to_vec();
    for i in 0..25_i32 {
        doc! { "seq": i }.to_writer(&mut bytes).unwrap();
    }
    // One skip marker and one length-correct garbage record along the way.
    bytes.write_all(&(-1_i32).to_le_bytes()).unwrap();
    bytes.extend_from_slice(&12_i32.to_le_bytes());
    bytes.extend_from_slice(&[0xFF; 8]);
    doc! { "seq": 25_i32 }.to_writer(&mut bytes).unwrap();

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(MemorySink::new());
    let engine = ReplayEngine::new(
        fast_config(write_archive(&dir, &bytes)),
        sink.clone(),
    );

    let report = engine.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.outcome, ReplayOutcome::Completed);
    assert_eq!(report.records_applied, 26);
    assert_eq!(report.records_decoded, 26);
    assert_eq!(report.markers_skipped, 1);
    assert_eq!(report.decode_errors, 1);

    let docs = sink.documents();
    assert_eq!(docs.len(), 26);
    for (i, doc) in docs.iter().enumerate() {
        assert_eq!(doc.get_i32("seq").unwrap(), i as i32);
    }
}

#[tokio::test]
async fn truncated_archive_aborts_the_run() {
    let mut bytes = MAGIC.to_vec();
    doc! { "seq": 0_i32 }.to_writer(&mut bytes).unwrap();
    let mut partial = Vec::new();
    doc! { "seq": 1_i32 }.to_writer(&mut partial).unwrap();
    partial.truncate(partial.len() - 4);
    bytes.extend_from_slice(&partial);

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(MemorySink::new());
    let engine = ReplayEngine::new(
        fast_config(write_archive(&dir, &bytes)),
        sink.clone(),
    );

    let err = engine.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Archive(ArchiveError::Truncated { .. })
    ));
    // The record before the corruption still went through.
    assert_eq!(sink.document_count(), 1);
}

#[tokio::test]
async fn missing_archive_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let engine = ReplayEngine::new(
        fast_config(dir.path().join("no-such-dump")),
        Arc::new(MemorySink::new()),
    );

    let err = engine.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ReplayError::Archive(ArchiveError::Io { .. })));
}

struct RejectingSink;

#[async_trait]
impl RecordSink for RejectingSink {
    async fn apply(&self, _record: &Record) -> Result<(), SinkError> {
        Err(SinkError::Rejected {
            reason: "collection is read-only".into(),
        })
    }

    fn name(&self) -> &str {
        "rejecting"
    }
}

#[tokio::test]
async fn sink_failure_stops_forwarding() {
    let mut bytes = MAGIC.to_vec();
    for i in 0..5_i32 {
        doc! { "seq": i }.to_writer(&mut bytes).unwrap();
    }

    let dir = TempDir::new().unwrap();
    let engine = ReplayEngine::new(
        fast_config(write_archive(&dir, &bytes)),
        Arc::new(RejectingSink),
    );

    let err = engine.run(CancellationToken::new()).await.unwrap_err();
    match err {
        ReplayError::Sink { index, .. } => assert_eq!(index, 1),
        other => panic!("expected Sink error, got {other}"),
    }
    assert_eq!(engine.metrics().records_applied, 0);
}

#[tokio::test]
async fn mid_run_cancellation_stops_the_decoder_early() {
    let mut bytes = MAGIC.to_vec();
    for i in 0..200_i32 {
        doc! { "seq": i }.to_writer(&mut bytes).unwrap();
    }

    let dir = TempDir::new().unwrap();
    let mut config = ReplayConfig::new(write_archive(&dir, &bytes));
    // Slow admission with a small buffer: the decoder parks on backpressure
    // almost immediately.
    config.sustained_rate = 2.0;
    config.burst_size = 1;
    config.buffer_capacity = 4;

    let sink = Arc::new(MemorySink::new());
    let engine = ReplayEngine::new(config, sink.clone());
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let report = engine.run(cancel).await.unwrap();

    assert_eq!(report.outcome, ReplayOutcome::Cancelled);
    // Decoding is lazy: only the buffered prefix was ever read, nowhere
    // near the archive's 200 records.
    assert!(
        report.records_decoded <= 32,
        "decoder ran ahead: {} records decoded",
        report.records_decoded
    );
    assert!(report.records_applied <= 5);
    assert_eq!(sink.document_count() as u64, report.records_applied);
}

#[tokio::test]
async fn pre_cancelled_run_applies_nothing() {
    let mut bytes = MAGIC.to_vec();
    for i in 0..5_i32 {
        doc! { "seq": i }.to_writer(&mut bytes).unwrap();
    }

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(MemorySink::new());
    let engine = ReplayEngine::new(
        fast_config(write_archive(&dir, &bytes)),
        sink.clone(),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = engine.run(cancel).await.unwrap();

    assert_eq!(report.outcome, ReplayOutcome::Cancelled);
    assert_eq!(report.records_applied, 0);
    assert_eq!(sink.document_count(), 0);
}
