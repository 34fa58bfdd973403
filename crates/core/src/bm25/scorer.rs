//! BM25 Okapi scoring engine.
//!
//! A [`Searcher`] borrows a frozen [`IndexData`], captures the document count
//! and average document length once, and then scores queries against it with
//! configurable `k1` and `b` parameters (see [`crate::config`]).

use crate::bm25::tokenizer::tokenize;
use crate::config;
use crate::document::DocId;
use crate::storage::IndexData;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// BM25 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f64,
    /// Length normalization strength, 0.0 (none) to 1.0 (full).
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: config::BM25_K1,
            b: config::BM25_B,
        }
    }
}

/// A ranked document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    /// Matching document.
    pub doc_id: DocId,
    /// Accumulated BM25 score over all query terms.
    pub score: f64,
}

/// Read-only BM25 ranker over an index snapshot.
#[derive(Debug)]
pub struct Searcher<'a> {
    index: &'a IndexData,
    params: Bm25Params,
    doc_count: usize,
    avg_doc_len: f64,
}

impl<'a> Searcher<'a> {
    /// Searcher with the default `k1 = 1.2`, `b = 0.75`.
    pub fn new(index: &'a IndexData) -> Self {
        Self::with_params(index, Bm25Params::default())
    }

    /// Searcher with caller-supplied `k1` and `b`.
    pub fn with_params(index: &'a IndexData, params: Bm25Params) -> Self {
        let doc_count = index.document_count();
        let avg_doc_len = if doc_count == 0 {
            0.0
        } else {
            index.total_length() as f64 / doc_count as f64
        };
        Self {
            index,
            params,
            doc_count,
            avg_doc_len,
        }
    }

    /// `N`, the number of documents captured at construction.
    pub fn document_count(&self) -> usize {
        self.doc_count
    }

    /// Mean length over distinct documents, 0 for an empty index.
    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    /// Inverse document frequency: `ln((N - df + 0.5) / (df + 0.5) + 1)`,
    /// or 0 for a term that is not indexed.
    pub fn idf(&self, term: &str) -> f64 {
        match self.index.inverted().document_frequency(term) {
            0 => 0.0,
            df => self.idf_for(df),
        }
    }

    fn idf_for(&self, df: usize) -> f64 {
        let n = self.doc_count as f64;
        let df = df as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Score every document against `text` and return the `top_k` best,
    /// highest score first; equal scores are ordered by ascending id.
    ///
    /// Query terms are not deduplicated: a repeated term contributes once per
    /// occurrence. Documents with a zero total are left out.
    pub fn query(&self, text: &str, top_k: usize) -> Vec<SearchHit> {
        let query_tokens = tokenize(text);
        if query_tokens.is_empty() || self.doc_count == 0 || top_k == 0 {
            return Vec::new();
        }

        let Bm25Params { k1, b } = self.params;
        let norm_len = self.avg_doc_len + config::BM25_EPSILON;
        let mut scores: HashMap<DocId, f64> = HashMap::with_capacity(256.min(self.doc_count));

        for token in query_tokens.iter() {
            let Some(postings) = self.index.postings(token) else {
                continue;
            };
            let idf = self.idf_for(postings.len());

            for posting in postings {
                let tf = posting.term_frequency as f64;
                let dl = self.index.document_length(posting.doc_id) as f64;
                let denom = tf + k1 * (1.0 - b + b * dl / norm_len);
                *scores.entry(posting.doc_id).or_insert(0.0) += idf * (tf * (k1 + 1.0) / denom);
            }
        }
        let matched = scores.len();

        // Partial sort: O(n log k) via min-heap of size k. The weakest entry
        // is the lowest score, and among equal scores the highest id.
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, Reverse<DocId>)>> =
            BinaryHeap::with_capacity(top_k.min(matched).saturating_add(1));
        for (id, score) in scores {
            if score == 0.0 {
                continue;
            }
            heap.push(Reverse((OrderedFloat(score), Reverse(id))));
            if heap.len() > top_k {
                heap.pop();
            }
        }
        let mut results: Vec<SearchHit> = heap
            .into_iter()
            .map(|Reverse((score, Reverse(doc_id)))| SearchHit {
                doc_id,
                score: score.0,
            })
            .collect();
        results.sort_unstable_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });

        tracing::debug!(
            "Query {:?}: {} terms, {} matching documents, {} returned",
            text,
            query_tokens.len(),
            matched,
            results.len()
        );
        results
    }
}
