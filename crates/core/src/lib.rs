//! # adeptsearch-core
//!
//! In-memory inverted text index with concurrent ingestion, a compact binary
//! snapshot format, and Okapi BM25 ranking.
//!
//! ```text
//! ingest:  text → Tokenizer → TermCounts → (write lock) IndexStore
//! persist: IndexStore ↔ snapshot codec ↔ bytes on disk
//! query:   text → Tokenizer → Searcher (read lock on IndexStore) → ranked hits
//! ```
//!
//! ```
//! use adeptsearch_core::IndexStore;
//!
//! let store = IndexStore::new();
//! store.ingest("a.txt", "cat dog");
//! store.ingest("b.txt", "cat cat dog dog dog");
//! let hits = store.search("dog", 10).unwrap();
//! assert_eq!(hits[0].doc_id, 2);
//! ```

/// BM25 full-text search: tokenizer, inverted index, and Okapi BM25 scoring.
pub mod bm25;
/// Global configuration constants: ranking parameters, word lists, defaults.
pub mod config;
/// Core document types: `DocId` and per-document `TermCounts`.
pub mod document;
/// Error type shared by every fallible operation.
pub mod error;
/// Storage layer: index store, document sources, and binary snapshots.
pub mod storage;

pub use bm25::{Bm25Params, SearchHit, Searcher};
pub use document::DocId;
pub use error::{Error, Result};
pub use storage::{IndexData, IndexStore, IngestReport};
