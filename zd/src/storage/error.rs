//! Storage error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving tasks
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StorageError::Lock {
            path: PathBuf::from("/tmp/zendo.json.lock"),
            source: std::io::Error::other("busy"),
        };
        assert!(err.to_string().contains("zendo.json.lock"));

        let err = StorageError::Unavailable("read-only".to_string());
        assert_eq!(err.to_string(), "Storage unavailable: read-only");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<Vec<u8>>("nope").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
