//! In-memory sink.
//!
//! Collects applied documents in RAM — memory use grows with every record,
//! so this is for tests and as the reference implementation of the
//! `RecordSink` contract, not for whole-archive runs. All data is lost when
//! the process exits.

use async_trait::async_trait;
use bson::Document;
use std::sync::Mutex;

use dumpreplay_core::{Record, RecordSink, SinkError};

#[derive(Default)]
pub struct MemorySink {
    docs: Mutex<Vec<Document>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents applied so far.
    pub fn document_count(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    /// All applied documents, in application order.
    pub fn documents(&self) -> Vec<Document> {
        self.docs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn apply(&self, record: &Record) -> Result<(), SinkError> {
        self.docs.lock().unwrap().push(record.document().clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bytes::Bytes;

    fn record(doc: Document) -> Record {
        let mut raw = Vec::new();
        doc.to_writer(&mut raw).unwrap();
        Record::new(Bytes::from(raw), doc)
    }

    #[tokio::test]
    async fn stores_documents_in_application_order() {
        let sink = MemorySink::new();
        sink.apply(&record(doc! { "i": 0_i32 })).await.unwrap();
        sink.apply(&record(doc! { "i": 1_i32 })).await.unwrap();

        let docs = sink.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get_i32("i").unwrap(), 0);
        assert_eq!(docs[1].get_i32("i").unwrap(), 1);
    }
}
