//! Command implementations over an explicit index session.

use adeptsearch_core::storage::collect_indexable_files;
use adeptsearch_core::IndexStore;
use std::io::Write;
use std::path::{Path, PathBuf};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// One index plus the optional snapshot file that carries it between runs.
pub struct Session {
    store: IndexStore,
    state: Option<PathBuf>,
}

impl Session {
    /// Start a session, restoring the state snapshot when one exists.
    pub fn open(state: Option<PathBuf>) -> adeptsearch_core::Result<Self> {
        let store = IndexStore::new();
        match state.as_deref() {
            Some(path) if path.exists() => store.load(path)?,
            Some(path) => tracing::debug!("State file {:?} not found, starting empty", path),
            None => {}
        }
        Ok(Self { store, state })
    }

    fn persist(&self) -> adeptsearch_core::Result<()> {
        if let Some(path) = &self.state {
            self.store.dump(path)?;
        }
        Ok(())
    }

    pub fn index(&self, dir: &Path, threads: usize, out: &mut impl Write) -> CommandResult {
        let files = collect_indexable_files(dir)?;
        if files.is_empty() {
            return Err(format!("no .txt files found in {}", dir.display()).into());
        }
        writeln!(out, "Indexing {} files...", files.len())?;
        let report = self.store.bulk_ingest(&files, threads);
        if report.failed > 0 {
            writeln!(out, "Skipped {} unreadable files.", report.failed)?;
        }
        writeln!(out, "Indexed {} documents.", self.store.document_count())?;
        self.persist()?;
        Ok(())
    }

    pub fn query(&self, text: &str, top_k: usize, json: bool, out: &mut impl Write) -> CommandResult {
        let hits = self.store.search(text, top_k)?;
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&hits)?)?;
            return Ok(());
        }
        let data = self.store.read();
        writeln!(out, "Top results:")?;
        for hit in &hits {
            let path = data.path_of(hit.doc_id).unwrap_or("?");
            writeln!(out, "DocId={} score={:.6} path={}", hit.doc_id, hit.score, path)?;
        }
        Ok(())
    }

    pub fn dump(&self, file: &Path, out: &mut impl Write) -> CommandResult {
        let bytes = self.store.dump(file)?;
        writeln!(out, "Dumped index to {} ({} bytes)", file.display(), bytes)?;
        Ok(())
    }

    pub fn load(&self, file: &Path, out: &mut impl Write) -> CommandResult {
        self.store.load(file)?;
        writeln!(out, "Loaded index. doc_count={}", self.store.document_count())?;
        self.persist()?;
        Ok(())
    }
}
