//! `ArchiveReader` — forward-only cursor over a length-prefixed BSON archive.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bson::Document;
use bytes::Bytes;
use tracing::{debug, warn};

use dumpreplay_core::{ArchiveError, Record};

/// Maximum permitted declared record size: the BSON document-size ceiling.
/// Records declaring more are rejected without reading the body, so a
/// misaligned stream cannot amplify into an unbounded allocation.
pub const MAX_DOCUMENT_SIZE: i32 = 16 * 1024 * 1024;

/// Smallest well-formed BSON document: 4-byte length plus the trailing NUL.
pub const MIN_DOCUMENT_SIZE: i32 = 5;

/// Stream header length. The header is opaque to the decoder; it is consumed
/// and otherwise ignored.
const HEADER_LEN: usize = 4;

/// A record whose declared size is -1 is a skip marker: consumed, no body.
const SKIP_MARKER: i32 = -1;

/// Decode-side counters, queryable at any point of the pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveStats {
    /// Records successfully decoded and handed off.
    pub records_decoded: u64,
    /// Skip markers consumed.
    pub markers_skipped: u64,
    /// Length-correct bodies dropped because they did not parse as BSON.
    pub decode_errors: u64,
    /// Bytes consumed from the stream so far, header included.
    pub bytes_read: u64,
}

/// Streaming archive decoder.
///
/// Produces records lazily via [`next_record`](Self::next_record) or the
/// `Iterator` impl. Any fatal error ends the sequence; the underlying stream
/// (and file handle, for [`open`](Self::open)) is released when the reader
/// is dropped, on every exit path.
pub struct ArchiveReader<R> {
    reader: R,
    offset: u64,
    done: bool,
    stats: ArchiveStats,
}

impl ArchiveReader<BufReader<File>> {
    /// Open an archive file and consume its stream header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let file = File::open(path.as_ref()).map_err(|source| ArchiveError::Io {
            offset: 0,
            source,
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> ArchiveReader<R> {
    /// Wrap a raw byte stream and consume the 4-byte stream header.
    ///
    /// A stream shorter than the header is treated as an empty archive.
    pub fn new(mut reader: R) -> Result<Self, ArchiveError> {
        let mut header = [0u8; HEADER_LEN];
        let read = read_full(&mut reader, &mut header)
            .map_err(|source| ArchiveError::Io { offset: 0, source })?;
        Ok(Self {
            reader,
            offset: read as u64,
            done: read < HEADER_LEN,
            stats: ArchiveStats {
                bytes_read: read as u64,
                ..ArchiveStats::default()
            },
        })
    }

    /// Decode the next record.
    ///
    /// Returns `Ok(None)` on clean end-of-archive (a short read of the 4-byte
    /// size field at a record boundary). Skip markers are consumed silently;
    /// bodies that are length-correct but fail to parse are dropped with a
    /// warning and decoding resumes at the next declared boundary. Every
    /// `Err` is fatal and permanently ends the sequence.
    pub fn next_record(&mut self) -> Result<Option<Record>, ArchiveError> {
        loop {
            if self.done {
                return Ok(None);
            }

            let mut size_buf = [0u8; 4];
            match read_full(&mut self.reader, &mut size_buf) {
                Ok(4) => {}
                Ok(_) => {
                    // Clean EOF at a record boundary: the normal end of archive.
                    self.done = true;
                    return Ok(None);
                }
                Err(source) => {
                    self.done = true;
                    return Err(ArchiveError::Io {
                        offset: self.offset,
                        source,
                    });
                }
            }

            let declared = i32::from_le_bytes(size_buf);

            if declared == SKIP_MARKER {
                self.offset += 4;
                self.stats.markers_skipped += 1;
                self.stats.bytes_read = self.offset;
                continue;
            }

            if !(MIN_DOCUMENT_SIZE..=MAX_DOCUMENT_SIZE).contains(&declared) {
                // The size field did not line up with a plausible document:
                // the stream is misaligned or corrupt, and reading on could
                // only produce garbage records.
                self.done = true;
                return Err(ArchiveError::Oversized {
                    offset: self.offset,
                    declared,
                    min: MIN_DOCUMENT_SIZE,
                    max: MAX_DOCUMENT_SIZE,
                });
            }

            let total = declared as usize;
            let mut buf = vec![0u8; total];
            buf[..4].copy_from_slice(&size_buf);

            match read_full(&mut self.reader, &mut buf[4..]) {
                Ok(n) if n == total - 4 => {}
                Ok(n) => {
                    self.done = true;
                    return Err(ArchiveError::Truncated {
                        offset: self.offset,
                        declared,
                        read: 4 + n,
                    });
                }
                Err(source) => {
                    self.done = true;
                    return Err(ArchiveError::Io {
                        offset: self.offset + 4,
                        source,
                    });
                }
            }

            let record_offset = self.offset;
            self.offset += total as u64;
            self.stats.bytes_read = self.offset;

            match Document::from_reader(buf.as_slice()) {
                Ok(doc) => {
                    self.stats.records_decoded += 1;
                    debug!(offset = record_offset, bytes = total, "record decoded");
                    return Ok(Some(Record::new(Bytes::from(buf), doc)));
                }
                Err(err) => {
                    // Length-correct but structurally invalid. The bytes were
                    // consumed at the declared boundary, so the next record
                    // starts cleanly; drop this one and keep going.
                    self.stats.decode_errors += 1;
                    warn!(
                        offset = record_offset,
                        declared,
                        error = %err,
                        "dropping undecodable record"
                    );
                    continue;
                }
            }
        }
    }

    /// Snapshot of the decode-side counters.
    pub fn stats(&self) -> ArchiveStats {
        self.stats
    }
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = Result<Record, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Like `read_exact`, but a clean EOF reports how many bytes arrived instead
/// of an error, so callers can tell boundary EOF from mid-record truncation.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
