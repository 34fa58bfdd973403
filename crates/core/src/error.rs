use std::path::PathBuf;
use thiserror::Error;

/// Main error type for adeptsearch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot access index file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt index data: {0}")]
    CorruptData(String),

    #[error("{field} value {value} does not fit the snapshot format")]
    ValueOutOfRange { field: &'static str, value: u64 },

    #[error("index is empty; run `index` first or `load` a dump")]
    EmptyIndex,
}

/// Result type alias for adeptsearch operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::CorruptData(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::corrupt("truncated term");
        assert_eq!(err.to_string(), "corrupt index data: truncated term");

        let err = Error::ValueOutOfRange {
            field: "document_id",
            value: 1 << 40,
        };
        assert!(err.to_string().contains("document_id"));

        let err = Error::io(
            "/nope/index.bin",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/nope/index.bin"));
    }

    #[test]
    fn test_empty_index_hint() {
        assert!(Error::EmptyIndex.to_string().contains("load"));
    }
}
