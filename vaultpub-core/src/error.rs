//! Error types for the publishing pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal failures. Anything that reaches the caller as a `SyncError` aborts the run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {artifact}: {source}")]
    Serialize {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to render metadata for {path:?}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SyncError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn walk(path: impl AsRef<Path>, source: walkdir::Error) -> Self {
        SyncError::Walk {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
