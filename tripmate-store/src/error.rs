use std::path::{Path, PathBuf};

use thiserror::Error;

/// Persistence failures. Callers are expected to surface these as
/// structured results and keep the conversation alive.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing user_id; cannot determine filename")]
    MissingUserId,

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}
