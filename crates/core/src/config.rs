//! Global configuration constants for adeptsearch.
//!
//! Ranking parameters, tokenizer word lists and CLI defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI
//! arguments and environment variables in the `adeptsearch` binary.

/// BM25 Okapi term frequency saturation parameter.
///
/// Controls how quickly term frequency saturates. Higher values allow TF to grow more.
/// Standard value is 1.2 (range: 1.0–2.0).
pub const BM25_K1: f64 = 1.2;

/// BM25 Okapi document length normalization parameter.
///
/// Controls the impact of document length on scoring. 0.0 = no normalization,
/// 1.0 = full normalization. Standard value is 0.75.
pub const BM25_B: f64 = 0.75;

/// Added to the average document length in the BM25 denominator so that an
/// index whose documents are all empty never divides by zero.
pub const BM25_EPSILON: f64 = 1e-9;

/// Default number of hits returned by a query.
pub const DEFAULT_TOP_K: usize = 10;

/// File extension (without the dot) picked up when indexing a directory.
pub const INDEXABLE_EXTENSION: &str = "txt";

/// Words dropped by the tokenizer before stemming.
pub const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "and", "a", "an", "of", "for", "in", "to", "with", "by",
    "that",
];

/// Environment variable naming the snapshot file shared between CLI invocations.
pub const STATE_ENV_VAR: &str = "ADEPTSEARCH_STATE";
