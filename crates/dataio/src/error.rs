use std::fmt;
use std::path::PathBuf;

use homologset_core::CoreError;
use thiserror::Error;

use crate::format::Format;

#[derive(Debug, Error)]
pub enum DataIoError {
    #[error("malformed {format} input: {message}")]
    Format { format: Format, message: String },

    #[error("{format} does not support {operation}")]
    Unsupported {
        format: Format,
        operation: &'static str,
    },

    #[error("cannot infer format from path: {0}")]
    UnknownFormat(String),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot checksum mismatch")]
    ChecksumMismatch,

    #[error("unsupported snapshot version: {0}")]
    SnapshotVersion(u32),

    #[error("entrez client error: {0}")]
    Client(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl DataIoError {
    pub(crate) fn format(format: Format, message: impl fmt::Display) -> Self {
        DataIoError::Format {
            format,
            message: message.to_string(),
        }
    }
}
