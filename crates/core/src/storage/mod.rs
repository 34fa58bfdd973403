//! Storage layer: the shared index store, document sources, and snapshots.
//!
//! Index state lives in memory behind an [`IndexStore`] handle. Snapshots
//! serialize the whole state into a length-prefixed little-endian format and
//! restore it wholesale.

/// Binary snapshot encode/decode and file save/load.
pub mod persistence;
/// File content readers and indexable-file discovery.
pub mod source;
/// Lock-guarded index state and concurrent ingestion.
pub mod store;

pub use persistence::{decode, encode, load_index, save_index};
pub use source::{collect_indexable_files, DocumentSource, FsSource};
pub use store::{IndexData, IndexStore, IngestReport};
