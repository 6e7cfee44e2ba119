use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures reading or writing the persisted JSON documents.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported document version {found} in {}", path.display())]
    UnsupportedVersion { path: PathBuf, found: u32 },
    #[error("unable to locate a config directory")]
    NoConfigDir,
    #[error("could not read input: {0}")]
    Input(#[source] io::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the file simply does not exist yet.
    pub fn is_missing(&self) -> bool {
        matches!(self, StorageError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Port text that is neither blank nor a valid port number.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid port {0:?}")]
pub struct InvalidPort(pub String);
