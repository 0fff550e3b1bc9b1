//! The `Record` type — one archived document plus its raw encoding.

use bson::Document;
use bytes::Bytes;

/// A single decoded archive record.
///
/// Holds both the raw length-prefixed bytes exactly as they appeared in the
/// archive and the decoded document form. Field order is preserved by
/// `bson::Document`, so re-encoding a well-formed record reproduces its raw
/// bytes. Records are immutable once produced; ownership moves from the
/// decoder to the dispatcher and the record is dropped after the sink
/// acknowledges (or permanently fails) the insert.
#[derive(Debug, Clone)]
pub struct Record {
    raw: Bytes,
    doc: Document,
}

impl Record {
    pub fn new(raw: Bytes, doc: Document) -> Self {
        Self { raw, doc }
    }

    /// The raw encoding, length prefix included.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The decoded document form (field order preserved).
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Total encoded length in bytes (the record's declared `size`).
    pub fn encoded_len(&self) -> usize {
        self.raw.len()
    }
}
