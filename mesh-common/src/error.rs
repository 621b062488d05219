//! Frame store errors

use std::path::PathBuf;

/// Errors raised while loading, validating or saving a frame sequence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or unreadable container
    #[error("malformed container: {0}")]
    Format(String),

    /// A frame disagrees with the vertex count of the mesh topology
    #[error("topology mismatch at frame {frame}: expected {expected} vertices, found {found}")]
    TopologyMismatch {
        frame: u32,
        expected: usize,
        found: usize,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
