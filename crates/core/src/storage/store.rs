//! Index store: the shared, lock-guarded index state and its ingestion paths.
//!
//! [`IndexData`] groups the path registry, the document length table and the
//! inverted index so that a single write lock covers all three. [`IndexStore`]
//! is the cloneable handle callers pass around; it tokenizes outside the lock
//! and only takes the write lock for the per-document structural update.

use crate::bm25::inverted_index::{InvertedIndex, Posting};
use crate::bm25::scorer::{SearchHit, Searcher};
use crate::document::{DocId, TermCounts};
use crate::error::{Error, Result};
use crate::storage::source::{DocumentSource, FsSource};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Internal data for an index, protected by a `RwLock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexData {
    /// Id handed to the next newly registered path.
    pub(crate) next_doc_id: DocId,
    /// doc id → number of terms produced by its latest tokenization
    pub(crate) doc_lengths: HashMap<DocId, u32>,
    /// source path → doc id
    pub(crate) paths: HashMap<String, DocId>,
    pub(crate) inverted: InvertedIndex,
}

impl Default for IndexData {
    fn default() -> Self {
        Self {
            next_doc_id: 1,
            doc_lengths: HashMap::new(),
            paths: HashMap::new(),
            inverted: InvertedIndex::new(),
        }
    }
}

impl IndexData {
    /// Creates a new empty index whose first document will receive id 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the id registered for `path`, registering it if unseen.
    /// Returns the id and whether the path was already known.
    fn assign_doc_id(&mut self, path: &str) -> (DocId, bool) {
        if let Some(&id) = self.paths.get(path) {
            return (id, true);
        }
        let id = self.next_doc_id;
        self.next_doc_id += 1;
        self.paths.insert(path.to_string(), id);
        (id, false)
    }

    /// Record a counted document under `path`.
    ///
    /// A path seen before keeps its id; its previous postings are dropped
    /// before the new ones are added and its length entry is overwritten.
    pub fn apply(&mut self, path: &str, counts: &TermCounts) -> DocId {
        let (id, existed) = self.assign_doc_id(path);
        if existed {
            self.inverted.remove_document(id);
        }
        self.inverted.add_document(id, counts);
        self.doc_lengths.insert(id, counts.length);
        id
    }

    /// Number of distinct registered documents.
    pub fn document_count(&self) -> usize {
        self.doc_lengths.len()
    }

    /// Stored length of `id`, or 0 when the id is unknown.
    pub fn document_length(&self, id: DocId) -> u32 {
        self.doc_lengths.get(&id).copied().unwrap_or(0)
    }

    /// Sum of every entry in the document length table.
    pub fn total_length(&self) -> u64 {
        self.doc_lengths.values().map(|&len| len as u64).sum()
    }

    /// Id the next newly registered path would receive.
    pub fn next_doc_id(&self) -> DocId {
        self.next_doc_id
    }

    /// The document length table.
    pub fn doc_lengths(&self) -> &HashMap<DocId, u32> {
        &self.doc_lengths
    }

    /// Iterate over `(path, doc id)` registrations in unspecified order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, DocId)> + '_ {
        self.paths.iter().map(|(p, &id)| (p.as_str(), id))
    }

    /// Id registered for `path`.
    pub fn document_id(&self, path: &str) -> Option<DocId> {
        self.paths.get(path).copied()
    }

    /// Path registered under `id`.
    ///
    /// Scans the whole registry, O(number of documents) per call.
    pub fn path_of(&self, id: DocId) -> Option<&str> {
        self.paths
            .iter()
            .find(|(_, &doc)| doc == id)
            .map(|(p, _)| p.as_str())
    }

    /// Number of distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.inverted.term_count()
    }

    /// Total number of postings across all terms.
    pub fn posting_count(&self) -> usize {
        self.inverted.posting_count()
    }

    /// The inverted index.
    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    /// Postings list for `term`.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.inverted.postings(term)
    }

    /// Validate cross-map invariants after deserialization.
    ///
    /// Registered ids must be unique, positive and below the next-id counter;
    /// every id in the length table or in a posting must be registered.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.next_doc_id == 0 {
            return Err("next document id must be positive".to_string());
        }

        let mut registered: HashSet<DocId> = HashSet::with_capacity(self.paths.len());
        for (path, &id) in &self.paths {
            if id == 0 || id >= self.next_doc_id {
                return Err(format!(
                    "path {:?} has id {} outside 1..{}",
                    path, id, self.next_doc_id
                ));
            }
            if !registered.insert(id) {
                return Err(format!("document id {} registered for two paths", id));
            }
        }

        for id in self.doc_lengths.keys() {
            if !registered.contains(id) {
                return Err(format!("length entry for unregistered document {}", id));
            }
        }

        for (term, postings) in self.inverted.iter() {
            for posting in postings {
                if !registered.contains(&posting.doc_id) {
                    return Err(format!(
                        "term {:?} has a posting for unregistered document {}",
                        term, posting.doc_id
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Outcome of a [`IndexStore::bulk_ingest`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents read and ingested.
    pub indexed: usize,
    /// Paths skipped because they could not be read.
    pub failed: usize,
}

/// A thread-safe handle to one in-memory index.
///
/// Cloning an `IndexStore` produces a new handle to the same shared data.
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    data: Arc<RwLock<IndexData>>,
}

impl IndexStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing index state.
    pub fn from_data(data: IndexData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Tokenize and count `content`, then register it under `path`.
    ///
    /// Only the registry, posting and length updates run under the write lock.
    pub fn ingest(&self, path: &str, content: &str) -> DocId {
        let counts = TermCounts::from_text(content);
        let id = self.data.write().apply(path, &counts);
        tracing::debug!(
            "Ingested {:?} as document {} ({} terms, {} distinct)",
            path,
            id,
            counts.length,
            counts.distinct_terms()
        );
        id
    }

    /// Read and ingest every path with `concurrency` worker threads, reading
    /// files from the local filesystem.
    pub fn bulk_ingest<P: AsRef<Path> + Sync>(&self, paths: &[P], concurrency: usize) -> IngestReport {
        self.bulk_ingest_from(paths, concurrency, &FsSource)
    }

    /// Read and ingest every path with `concurrency` worker threads.
    ///
    /// Workers claim the next unprocessed path through a shared atomic cursor
    /// until the list is exhausted. A path whose content cannot be read is
    /// logged and skipped; the remaining paths are still ingested.
    pub fn bulk_ingest_from<P, S>(&self, paths: &[P], concurrency: usize, source: &S) -> IngestReport
    where
        P: AsRef<Path> + Sync,
        S: DocumentSource + ?Sized,
    {
        if paths.is_empty() {
            return IngestReport::default();
        }
        let workers = concurrency.clamp(1, paths.len());
        let cursor = AtomicUsize::new(0);
        let indexed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = paths.get(i) else { break };
                    let path = path.as_ref();
                    let Some(key) = path.to_str() else {
                        tracing::warn!("Skipping {:?}: path is not valid UTF-8", path);
                        failed.fetch_add(1, Ordering::Relaxed);
                        continue;
                    };
                    match source.read(path) {
                        Ok(content) => {
                            self.ingest(key, &content);
                            indexed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            tracing::warn!("Failed to read {:?}: {}", path, e);
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        let report = IngestReport {
            indexed: indexed.into_inner(),
            failed: failed.into_inner(),
        };
        tracing::info!(
            "Bulk ingestion finished: {} indexed, {} failed, {} workers",
            report.indexed,
            report.failed,
            workers
        );
        report
    }

    /// Number of distinct registered documents.
    pub fn document_count(&self) -> usize {
        self.data.read().document_count()
    }

    /// Stored length of `id`, or 0 when the id is unknown.
    pub fn document_length(&self, id: DocId) -> u32 {
        self.data.read().document_length(id)
    }

    /// Shared read access to the full index state.
    ///
    /// Ingestion blocks while the guard is held, so a [`Searcher`] built from
    /// it sees a frozen index.
    pub fn read(&self) -> RwLockReadGuard<'_, IndexData> {
        self.data.read()
    }

    /// Replace the whole index state, returning the previous one.
    pub fn replace(&self, data: IndexData) -> IndexData {
        std::mem::replace(&mut *self.data.write(), data)
    }

    /// Rank documents against `query` with default BM25 parameters.
    ///
    /// Fails with [`Error::EmptyIndex`] when nothing has been ingested.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let data = self.data.read();
        if data.document_count() == 0 {
            return Err(Error::EmptyIndex);
        }
        Ok(Searcher::new(&data).query(query, top_k))
    }

    /// Serialize the index to `path`. See [`crate::storage::persistence`].
    pub fn dump(&self, path: &Path) -> Result<u64> {
        crate::storage::persistence::save_index(self, path)
    }

    /// Replace the index with the snapshot at `path`.
    pub fn load(&self, path: &Path) -> Result<()> {
        crate::storage::persistence::load_index(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    /// In-memory source; paths missing from the map fail to read.
    struct MapSource(HashMap<PathBuf, String>);

    impl DocumentSource for MapSource {
        fn read(&self, path: &Path) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such document"))
        }
    }

    fn corpus(n: usize) -> (Vec<PathBuf>, MapSource) {
        let words = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta"];
        let mut map = HashMap::new();
        let mut paths = Vec::new();
        for i in 0..n {
            let path = PathBuf::from(format!("docs/{i:03}.txt"));
            let text: Vec<&str> = (0..=i % 11).map(|j| words[(i + j * 3) % words.len()]).collect();
            map.insert(path.clone(), text.join(" "));
            paths.push(path);
        }
        (paths, MapSource(map))
    }

    /// Length table and posting sets keyed by path, independent of id assignment order.
    fn by_path(data: &IndexData) -> (HashMap<String, u32>, HashMap<String, HashSet<(String, u32)>>) {
        let lengths = data
            .paths()
            .map(|(p, id)| (p.to_string(), data.document_length(id)))
            .collect();
        let mut postings: HashMap<String, HashSet<(String, u32)>> = HashMap::new();
        for (term, list) in data.inverted().iter() {
            let set = postings.entry(term.to_string()).or_default();
            for p in list {
                set.insert((data.path_of(p.doc_id).unwrap().to_string(), p.term_frequency));
            }
        }
        (lengths, postings)
    }

    #[test]
    fn test_ingest_assigns_sequential_ids() {
        let store = IndexStore::new();
        assert_eq!(store.ingest("a.txt", "cat dog"), 1);
        assert_eq!(store.ingest("b.txt", "cat dog"), 2);
        assert_eq!(store.ingest("c.txt", "cat dog"), 3);
        assert_eq!(store.document_count(), 3);
        assert_eq!(store.read().next_doc_id(), 4);
    }

    #[test]
    fn test_same_content_new_path_adds_one_document() {
        let store = IndexStore::new();
        store.ingest("first.txt", "shared content here");
        let before = store.document_count();
        let id = store.ingest("second.txt", "shared content here");
        assert_eq!(store.document_count(), before + 1);
        assert_eq!(id as usize, before + 1);
    }

    #[test]
    fn test_document_length_and_unknown_id() {
        let store = IndexStore::new();
        let id = store.ingest("a.txt", "the cat sat on the mat");
        assert_eq!(store.document_length(id), 3);
        assert_eq!(store.document_length(42), 0);
    }

    #[test]
    fn test_empty_content_registers_zero_length_document() {
        let store = IndexStore::new();
        let id = store.ingest("empty.txt", "");
        assert_eq!(store.document_count(), 1);
        assert_eq!(store.document_length(id), 0);
        assert_eq!(store.read().inverted().posting_count(), 0);
    }

    #[test]
    fn test_reingest_replaces_postings_and_length() {
        let store = IndexStore::new();
        let id = store.ingest("a.txt", "cat cat dog");
        store.ingest("b.txt", "dog");
        let again = store.ingest("a.txt", "bird");
        assert_eq!(again, id);
        assert_eq!(store.document_count(), 2);
        assert_eq!(store.document_length(id), 1);

        let data = store.read();
        assert!(data.postings("cat").is_none());
        assert_eq!(data.postings("dog").unwrap().len(), 1);
        assert_eq!(
            data.postings("bird").unwrap(),
            &[Posting {
                doc_id: id,
                term_frequency: 1
            }]
        );
        assert_eq!(data.next_doc_id(), 3);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_bulk_ingest_skips_unreadable_paths() {
        let (mut paths, source) = corpus(5);
        paths.insert(2, PathBuf::from("docs/missing.txt"));
        let store = IndexStore::new();
        let report = store.bulk_ingest_from(&paths, 3, &source);
        assert_eq!(report, IngestReport { indexed: 5, failed: 1 });
        assert_eq!(store.document_count(), 5);
        assert!(store.read().document_id("docs/missing.txt").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_bulk_ingest_skips_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let a = PathBuf::from(OsStr::from_bytes(b"docs/doc\xff.txt"));
        let b = PathBuf::from(OsStr::from_bytes(b"docs/doc\xfe.txt"));
        let ok = PathBuf::from("docs/plain.txt");
        let source = MapSource(HashMap::from([
            (a.clone(), "first document".to_string()),
            (b.clone(), "second document".to_string()),
            (ok.clone(), "third document".to_string()),
        ]));

        let store = IndexStore::new();
        let report = store.bulk_ingest_from(&[a, b, ok], 1, &source);
        assert_eq!(report, IngestReport { indexed: 1, failed: 2 });
        assert_eq!(store.document_count(), 1);
        assert_eq!(store.read().document_id("docs/plain.txt"), Some(1));
    }

    #[test]
    fn test_term_and_posting_counts() {
        let store = IndexStore::new();
        store.ingest("a.txt", "cat dog");
        store.ingest("b.txt", "cat bird");
        let data = store.read();
        assert_eq!(data.term_count(), 3);
        assert_eq!(data.posting_count(), 4);
        assert_eq!(data.path_of(2), Some("b.txt"));
        assert_eq!(data.path_of(9), None);
    }

    #[test]
    fn test_bulk_ingest_empty_and_zero_workers() {
        let store = IndexStore::new();
        let none: Vec<PathBuf> = Vec::new();
        assert_eq!(store.bulk_ingest_from(&none, 4, &MapSource(HashMap::new())), IngestReport::default());

        let (paths, source) = corpus(4);
        let report = store.bulk_ingest_from(&paths, 0, &source);
        assert_eq!(report.indexed, 4);
    }

    #[test]
    fn test_bulk_ingest_same_content_for_any_worker_count() {
        let (paths, source) = corpus(64);
        let single = IndexStore::new();
        single.bulk_ingest_from(&paths, 1, &source);

        for workers in [2, 4, 8, 100] {
            let parallel = IndexStore::new();
            let report = parallel.bulk_ingest_from(&paths, workers, &source);
            assert_eq!(report.indexed, 64);
            assert_eq!(parallel.document_count(), single.document_count());
            assert_eq!(by_path(&parallel.read()), by_path(&single.read()));
            assert!(parallel.read().validate().is_ok());

            let mut ids: Vec<DocId> = parallel.read().paths().map(|(_, id)| id).collect();
            ids.sort_unstable();
            assert_eq!(ids, (1..=64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_concurrent_ingest_from_many_handles() {
        let store = IndexStore::new();
        thread::scope(|scope| {
            for t in 0..8 {
                let store = store.clone();
                scope.spawn(move || {
                    for i in 0..25 {
                        store.ingest(&format!("t{t}/d{i}.txt"), "common words appear everywhere");
                    }
                });
            }
        });
        assert_eq!(store.document_count(), 200);
        assert_eq!(store.read().postings("common").unwrap().len(), 200);
    }

    #[test]
    fn test_search_on_empty_store_is_an_error() {
        let store = IndexStore::new();
        assert!(matches!(store.search("anything", 10), Err(Error::EmptyIndex)));
    }

    #[test]
    fn test_replace_swaps_whole_state() {
        let store = IndexStore::new();
        store.ingest("a.txt", "cat");
        let old = store.replace(IndexData::new());
        assert_eq!(old.document_count(), 1);
        assert_eq!(store.document_count(), 0);
        assert_eq!(store.ingest("b.txt", "dog"), 1);
    }

    #[test]
    fn test_validate_rejects_dangling_ids() {
        let mut data = IndexData::new();
        data.apply("a.txt", &TermCounts::from_text("cat"));
        data.doc_lengths.insert(7, 3);
        assert!(data.validate().is_err());

        let mut data = IndexData::new();
        data.apply("a.txt", &TermCounts::from_text("cat"));
        data.next_doc_id = 1;
        assert!(data.validate().is_err());
    }
}
