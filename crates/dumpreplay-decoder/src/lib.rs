//! # dumpreplay-decoder
//!
//! Streaming decoder for length-prefixed BSON archives (`mongodump`-style
//! dump files). The reader is a strict forward, single-pass cursor: it never
//! seeks backward, never re-reads, and hands each record off as soon as it is
//! decoded, so memory use is bounded by one document rather than by archive
//! size.
//!
//! ## Archive layout
//! ```text
//! [4 bytes]   stream header / magic (opaque, skipped, not validated)
//! repeat {
//!   [4 bytes]   i32 LE `size` — total record bytes, inclusive of these 4
//!   [size - 4]  document body, absent when size == -1 (skip marker)
//! }
//! (archive ends at EOF or a clean short read of the size field)
//! ```
//!
//! The inclusive size prefix is BSON's own length convention, so the prefix
//! plus body together form one complete BSON document.

pub mod reader;

pub use reader::{ArchiveReader, ArchiveStats, MAX_DOCUMENT_SIZE, MIN_DOCUMENT_SIZE};
