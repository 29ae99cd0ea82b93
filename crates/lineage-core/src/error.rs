//! Errors surfaced by graph loading.

use std::path::PathBuf;

/// The only failures the core reports: a source that cannot be opened or read.
/// Malformed lines and undescribed parents are absorbed, not raised.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read input stream: {0}")]
    Read(#[from] std::io::Error),
}

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
