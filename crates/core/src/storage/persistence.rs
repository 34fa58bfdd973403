//! Disk persistence for the index using a length-prefixed binary snapshot.
//!
//! All integers are 4 bytes, little-endian. Layout:
//!
//! ```text
//! next_doc_id            i32
//! doc_length_count       u32
//!   document_id          i32
//!   length               i32
//! path_registry_count    u32
//!   path_length          u32
//!   path_bytes           [u8; path_length]
//!   document_id          i32
//! term_count             u32
//!   term_length          u32
//!   term_bytes           [u8; term_length]
//!   posting_count        u32
//!     document_id        i32
//!     term_frequency     i32
//! ```
//!
//! There is no magic number, version or checksum. Lengths and registry
//! entries are written in ascending document id and terms in byte order, so
//! the same state always encodes to the same bytes. Decoding bounds-checks
//! every read and validates the result before it replaces anything.

use crate::bm25::inverted_index::{InvertedIndex, Posting};
use crate::document::DocId;
use crate::error::{Error, Result};
use crate::storage::store::{IndexData, IndexStore};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialize the full index state.
pub fn encode(data: &IndexData) -> Result<Vec<u8>> {
    let mut out = SnapshotWriter::with_capacity(
        16 + data.doc_lengths.len() * 8 + data.inverted.posting_count() * 8,
    );

    out.put_i32("next_doc_id", data.next_doc_id)?;

    let mut lengths: Vec<(DocId, u32)> = data.doc_lengths.iter().map(|(&id, &len)| (id, len)).collect();
    lengths.sort_unstable();
    out.put_count("doc_length_count", lengths.len())?;
    for (id, len) in lengths {
        out.put_i32("document_id", id)?;
        out.put_i32("length", len)?;
    }

    let mut paths: Vec<(&str, DocId)> = data.paths().collect();
    paths.sort_unstable_by_key(|&(path, id)| (id, path));
    out.put_count("path_registry_count", paths.len())?;
    for (path, id) in paths {
        out.put_bytes("path_length", path.as_bytes())?;
        out.put_i32("document_id", id)?;
    }

    let mut terms: Vec<(&str, &[Posting])> = data.inverted.iter().collect();
    terms.sort_unstable_by_key(|&(term, _)| term);
    out.put_count("term_count", terms.len())?;
    for (term, postings) in terms {
        out.put_bytes("term_length", term.as_bytes())?;
        out.put_count("posting_count", postings.len())?;
        for posting in postings {
            out.put_i32("document_id", posting.doc_id)?;
            out.put_i32("term_frequency", posting.term_frequency)?;
        }
    }

    Ok(out.into_inner())
}

/// Deserialize and validate a full index state.
pub fn decode(bytes: &[u8]) -> Result<IndexData> {
    let mut r = SnapshotReader::new(bytes);

    let next_doc_id = r.positive("next_doc_id")?;

    let count = r.count("doc_length_count", 8)?;
    let mut doc_lengths = HashMap::with_capacity(count);
    for _ in 0..count {
        let id = r.positive("document_id")?;
        let len = r.non_negative("length")?;
        if doc_lengths.insert(id, len).is_some() {
            return Err(Error::corrupt(format!("duplicate length entry for document {id}")));
        }
    }

    let count = r.count("path_registry_count", 8)?;
    let mut paths = HashMap::with_capacity(count);
    for _ in 0..count {
        let path = r.string("path")?;
        let id = r.positive("document_id")?;
        if paths.insert(path, id).is_some() {
            return Err(Error::corrupt(format!("duplicate path entry for document {id}")));
        }
    }

    let count = r.count("term_count", 8)?;
    let mut inverted = InvertedIndex::new();
    for _ in 0..count {
        let term = r.string("term")?;
        let posting_count = r.count("posting_count", 8)?;
        let mut postings = Vec::with_capacity(posting_count);
        for _ in 0..posting_count {
            postings.push(Posting {
                doc_id: r.positive("document_id")?,
                term_frequency: r.non_negative("term_frequency")?,
            });
        }
        if inverted.postings(&term).is_some() {
            return Err(Error::corrupt(format!("duplicate term {term:?}")));
        }
        inverted.insert_postings(term, postings);
    }

    if r.remaining() != 0 {
        return Err(Error::corrupt(format!(
            "{} trailing bytes after the inverted index",
            r.remaining()
        )));
    }

    let data = IndexData {
        next_doc_id,
        doc_lengths,
        paths,
        inverted,
    };
    data.validate().map_err(Error::CorruptData)?;
    Ok(data)
}

/// Write a snapshot of `store` to `path` with atomic write (temp file + rename).
/// Returns the number of bytes written.
pub fn save_index(store: &IndexStore, path: &Path) -> Result<u64> {
    let bytes = encode(&store.read())?;

    let tmp_path = temp_path(path);
    fs::write(&tmp_path, &bytes).map_err(|e| Error::io(path, e))?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::io(path, e));
    }

    tracing::info!("Saved index to {:?} ({} bytes)", path, bytes.len());
    Ok(bytes.len() as u64)
}

/// Replace the contents of `store` with the snapshot at `path`.
///
/// The file is decoded into a separate state first; on any error the store
/// is left untouched.
pub fn load_index(store: &IndexStore, path: &Path) -> Result<()> {
    let raw = fs::read(path).map_err(|e| Error::io(path, e))?;
    let data = decode(&raw)?;
    let documents = data.document_count();
    let terms = data.inverted.term_count();
    store.replace(data);

    tracing::info!(
        "Loaded index from {:?} ({} documents, {} terms)",
        path,
        documents,
        terms
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

struct SnapshotWriter {
    buf: Vec<u8>,
}

impl SnapshotWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn put_i32(&mut self, field: &'static str, value: u32) -> Result<()> {
        let value = i32::try_from(value).map_err(|_| Error::ValueOutOfRange {
            field,
            value: value as u64,
        })?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn put_count(&mut self, field: &'static str, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| Error::ValueOutOfRange {
            field,
            value: count as u64,
        })?;
        self.buf.extend_from_slice(&count.to_le_bytes());
        Ok(())
    }

    fn put_bytes(&mut self, field: &'static str, bytes: &[u8]) -> Result<()> {
        self.put_count(field, bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

struct SnapshotReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SnapshotReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::corrupt(format!(
                "{field} at offset {} needs {len} bytes, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn word(&mut self, field: &str) -> Result<[u8; 4]> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take(4, field)?);
        Ok(word)
    }

    fn u32(&mut self, field: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.word(field)?))
    }

    fn i32(&mut self, field: &str) -> Result<i32> {
        Ok(i32::from_le_bytes(self.word(field)?))
    }

    fn non_negative(&mut self, field: &str) -> Result<u32> {
        let offset = self.pos;
        let value = self.i32(field)?;
        u32::try_from(value)
            .map_err(|_| Error::corrupt(format!("{field} at offset {offset} is negative ({value})")))
    }

    fn positive(&mut self, field: &str) -> Result<u32> {
        let offset = self.pos;
        match self.non_negative(field)? {
            0 => Err(Error::corrupt(format!("{field} at offset {offset} is zero"))),
            value => Ok(value),
        }
    }

    /// Read an element count and reject it early if even the smallest
    /// possible elements could not fit in the remaining bytes.
    fn count(&mut self, field: &str, min_element_len: usize) -> Result<usize> {
        let offset = self.pos;
        let count = self.u32(field)? as usize;
        if count.saturating_mul(min_element_len) > self.remaining() {
            return Err(Error::corrupt(format!(
                "{field} at offset {offset} declares {count} entries, only {} bytes left",
                self.remaining()
            )));
        }
        Ok(count)
    }

    fn string(&mut self, field: &str) -> Result<String> {
        let len = self.u32(field)? as usize;
        let offset = self.pos;
        let bytes = self.take(len, field)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::corrupt(format!("{field} at offset {offset} is not valid UTF-8")))
    }
}
