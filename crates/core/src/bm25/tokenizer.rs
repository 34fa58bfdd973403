//! Text normalizer and suffix-stripping tokenizer.
//!
//! Lowercases alphanumerics and apostrophes, turns every other character into
//! a word break, removes stop words, strips one of the `-ing`, `-ed` or `-s`
//! suffixes and discards single-character terms. Ingestion and querying share
//! this pipeline so that both sides produce the same vocabulary.
//!
//! Stemming only ever shortens a word, so each term is a prefix of a word in
//! the normalized buffer. [`Tokens`] keeps that buffer plus byte spans and
//! hands out `&str` slices without a per-term allocation.

use crate::config::STOP_WORDS;
use std::collections::HashSet;
use std::sync::LazyLock;

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Tokenized text: owns the normalized buffer, provides &str slices via byte spans.
#[derive(Debug, Clone)]
pub struct Tokens {
    buffer: String,
    spans: Vec<(u32, u32)>, // (start, end) byte offsets into buffer
}

impl Tokens {
    /// Returns an iterator over the terms, in input order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|&(s, e)| &self.buffer[s as usize..e as usize])
    }

    /// Returns the number of terms.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Copies the terms out into owned strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }
}

/// Tokenize text: normalize, split, drop stop words, stem, drop short terms.
pub fn tokenize(text: &str) -> Tokens {
    let buffer = normalize(text);
    let mut spans = Vec::new();

    let mut offset = 0usize;
    for word in buffer.split(' ') {
        let start = offset;
        offset += word.len() + 1;
        if word.is_empty() || STOP_WORD_SET.contains(word) {
            continue;
        }
        let stemmed = stem(word);
        if stemmed.chars().count() > 1 {
            spans.push((start as u32, (start + stemmed.len()) as u32));
        }
    }

    Tokens { buffer, spans }
}

/// Lowercase alphanumerics and apostrophes; every other character becomes a
/// single space. Runs of spaces collapse and the result carries no leading or
/// trailing space.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_alphanumeric() || c == '\'' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            // Some lowercase mappings add combining marks; keep only word characters.
            out.extend(
                c.to_lowercase()
                    .filter(|l| l.is_alphanumeric() || *l == '\''),
            );
        } else {
            pending_space = true;
        }
    }
    out
}

/// Strip at most one suffix. Rules are tried in order and the first match wins:
/// `-ing` on words longer than four characters, `-ed` on words longer than
/// three, then a trailing `s` on words longer than two. A possessive `'s`
/// keeps its `s`.
pub fn stem(word: &str) -> &str {
    let len = word.chars().count();
    if len > 4 && word.ends_with("ing") {
        return &word[..word.len() - 3];
    }
    if len > 3 && word.ends_with("ed") {
        return &word[..word.len() - 2];
    }
    if len > 2 && word.ends_with('s') && !word.ends_with("'s") {
        return &word[..word.len() - 1];
    }
    word
}
