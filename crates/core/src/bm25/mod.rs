//! BM25 full-text search engine.
//!
//! Implements Okapi BM25 scoring with an inverted index for keyword search.
//! Documents and queries are tokenized by the same normalizing tokenizer with
//! stop word removal and light suffix stripping.

/// Inverted index data structure with postings lists.
pub mod inverted_index;
/// BM25 Okapi scoring and query execution.
pub mod scorer;
/// Normalizing tokenizer with stop word filtering and suffix stripping.
pub mod tokenizer;

pub use inverted_index::{InvertedIndex, Posting};
pub use scorer::{Bm25Params, SearchHit, Searcher};
pub use tokenizer::tokenize;
