//! Corpus error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::checksum::ChecksumFailure;

/// Errors that can occur while generating, reading or verifying a corpus
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported pack scheme: {0}")]
    UnsupportedPackScheme(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Chunk gap: expected start {expected}, found {actual}; clean up or regenerate the corpus")]
    Gap { expected: u64, actual: u64 },

    #[error(
        "Chunk overlap: expected start {expected}, found {actual} (previous chunk ends at {previous_end}); clean up or regenerate the corpus"
    )]
    Overlap { expected: u64, actual: u64, previous_end: u64 },

    #[error("Integrity check failed:\n{}", FailureList(failures))]
    Integrity { failures: Vec<ChecksumFailure> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorpusError {
    /// Check if this is a chunk layout error (gap or overlap)
    pub fn is_structure(&self) -> bool {
        matches!(self, CorpusError::Gap { .. } | CorpusError::Overlap { .. })
    }

    /// Map a missing-file IO error to NotFound for the given path
    pub(crate) fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CorpusError::NotFound { path: path.into() }
        } else {
            CorpusError::Io(err)
        }
    }
}

struct FailureList<'a>(&'a [ChecksumFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

/// Result alias for corpus operations
pub type Result<T> = std::result::Result<T, CorpusError>;
