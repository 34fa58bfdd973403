//! Inverted index for BM25 full-text search.
//!
//! Maps terms to postings lists (document ID + term frequency). Within a term,
//! postings appear in the order their documents were ingested.

use crate::document::{DocId, TermCounts};
use std::collections::HashMap;

/// A single entry in a term's postings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Posting {
    /// Document the term occurs in.
    pub doc_id: DocId,
    /// Number of times the term appears in this document.
    pub term_frequency: u32,
}

/// Inverted index mapping terms to postings lists.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    /// term → list of postings
    index: HashMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    /// Creates a new empty inverted index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one posting per distinct term of an already counted document.
    pub fn add_document(&mut self, doc_id: DocId, counts: &TermCounts) {
        for (term, &tf) in &counts.frequencies {
            let posting = Posting {
                doc_id,
                term_frequency: tf,
            };
            match self.index.get_mut(term.as_str()) {
                Some(postings) => postings.push(posting),
                None => {
                    self.index.insert(term.clone(), vec![posting]);
                }
            }
        }
    }

    /// Remove every posting of `doc_id`, dropping terms left without postings.
    pub fn remove_document(&mut self, doc_id: DocId) {
        self.index.retain(|_, postings| {
            postings.retain(|p| p.doc_id != doc_id);
            !postings.is_empty()
        });
    }

    /// Postings list for `term`, if any document contains it.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.index.get(term).map(Vec::as_slice)
    }

    /// Number of postings recorded for `term` (0 when absent).
    pub fn document_frequency(&self, term: &str) -> usize {
        self.index.get(term).map_or(0, Vec::len)
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.index.len()
    }

    /// Total number of postings across all terms.
    pub fn posting_count(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }

    /// Iterate over `(term, postings)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> + '_ {
        self.index.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Install a complete postings list for a term, replacing any existing one.
    pub(crate) fn insert_postings(&mut self, term: String, postings: Vec<Posting>) {
        self.index.insert(term, postings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(idx: &mut InvertedIndex, id: DocId, text: &str) {
        idx.add_document(id, &TermCounts::from_text(text));
    }

    #[test]
    fn test_add_document_updates_index() {
        let mut idx = InvertedIndex::new();
        add(&mut idx, 1, "the quick brown fox");
        assert!(idx.postings("quick").is_some());
        assert!(idx.postings("brown").is_some());
        assert!(idx.postings("fox").is_some());
        // "the" is a stop word, should not be indexed
        assert!(idx.postings("the").is_none());
    }

    #[test]
    fn test_term_frequency() {
        let mut idx = InvertedIndex::new();
        add(&mut idx, 1, "hello hello hello world");
        let postings = idx.postings("hello").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].term_frequency, 3);
    }

    #[test]
    fn test_multiple_documents() {
        let mut idx = InvertedIndex::new();
        add(&mut idx, 1, "rust programming language");
        add(&mut idx, 2, "python programming language");
        assert_eq!(idx.document_frequency("programm"), 2);
        assert_eq!(idx.document_frequency("rust"), 1);
        assert_eq!(idx.document_frequency("missing"), 0);
        assert_eq!(idx.term_count(), 4);
        assert_eq!(idx.posting_count(), 6);
    }

    #[test]
    fn test_postings_keep_ingestion_order() {
        let mut idx = InvertedIndex::new();
        add(&mut idx, 3, "shared");
        add(&mut idx, 1, "shared");
        add(&mut idx, 2, "shared");
        let ids: Vec<DocId> = idx.postings("shared").unwrap().iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_document() {
        let mut idx = InvertedIndex::new();
        add(&mut idx, 1, "hello world");
        add(&mut idx, 2, "hello rust");
        idx.remove_document(1);
        // "world" only appeared in doc 1, should be gone
        assert!(idx.postings("world").is_none());
        let postings = idx.postings("hello").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].doc_id, 2);
    }

    #[test]
    fn test_remove_nonexistent_doc() {
        let mut idx = InvertedIndex::new();
        add(&mut idx, 1, "hello world");
        idx.remove_document(99); // should not panic
        assert_eq!(idx.posting_count(), 2);
    }
}
