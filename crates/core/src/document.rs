//! Core document types for adeptsearch.
//!
//! A document is identified by a [`DocId`] assigned when its source path is
//! first registered. [`TermCounts`] holds the per-document statistics that
//! ingestion computes before it touches any shared state.

use crate::bm25::tokenizer::tokenize;
use std::collections::HashMap;

/// Dense, positive document identifier. The n-th distinct path registered
/// receives id n; ids are never reused.
pub type DocId = u32;

/// Term frequencies and total length of one tokenized document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCounts {
    /// term → number of occurrences in the document
    pub frequencies: HashMap<String, u32>,
    /// Sum of all frequencies (number of terms after tokenization).
    pub length: u32,
}

impl TermCounts {
    /// Tokenize `text` and count each term.
    pub fn from_text(text: &str) -> Self {
        let tokens = tokenize(text);
        let mut frequencies: HashMap<String, u32> = HashMap::with_capacity(tokens.len());
        for token in tokens.iter() {
            match frequencies.get_mut(token) {
                Some(tf) => *tf += 1,
                None => {
                    frequencies.insert(token.to_string(), 1);
                }
            }
        }
        Self {
            frequencies,
            length: tokens.len() as u32,
        }
    }

    /// Number of distinct terms.
    pub fn distinct_terms(&self) -> usize {
        self.frequencies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_length() {
        let counts = TermCounts::from_text("cat cat dog dog dog");
        assert_eq!(counts.length, 5);
        assert_eq!(counts.distinct_terms(), 2);
        assert_eq!(counts.frequencies["cat"], 2);
        assert_eq!(counts.frequencies["dog"], 3);
    }

    #[test]
    fn test_stemmed_forms_merge() {
        let counts = TermCounts::from_text("Tests test testing");
        assert_eq!(counts.frequencies.len(), 1);
        assert_eq!(counts.frequencies["test"], 3);
    }

    #[test]
    fn test_empty_text() {
        let counts = TermCounts::from_text("the of and");
        assert_eq!(counts, TermCounts::default());
    }
}
