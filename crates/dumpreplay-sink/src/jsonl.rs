//! JSON-lines sink.
//!
//! Appends each applied document as one line of relaxed Extended JSON. Gives
//! the CLI a concrete, inspectable destination without a live document store.

use async_trait::async_trait;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use dumpreplay_core::{Record, RecordSink, SinkError};

pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Create (truncating) the output file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "json-lines sink open");
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn apply(&self, record: &Record) -> Result<(), SinkError> {
        let value = bson::Bson::Document(record.document().clone()).into_relaxed_extjson();
        let line = serde_json::to_string(&value)
            .map_err(|e| SinkError::Other(format!("extended JSON encode: {e}")))?;

        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{line}")?;
        // Flushed per record so the output is tailable mid-run.
        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json-lines"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bytes::Bytes;

    #[tokio::test]
    async fn writes_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let sink = JsonLinesSink::create(&path).unwrap();

        for i in 0..3_i32 {
            let doc = doc! { "i": i, "tag": "x" };
            let mut raw = Vec::new();
            doc.to_writer(&mut raw).unwrap();
            sink.apply(&Record::new(Bytes::from(raw), doc)).await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for (i, line) in lines.iter().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["i"], i as i64);
            assert_eq!(value["tag"], "x");
        }
    }
}
