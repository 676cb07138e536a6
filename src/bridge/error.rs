//! Error taxonomy for the file bridge.
//!
//! Cancelling a dialog is not an error and never shows up here; see
//! [`FileSelection::Cancelled`](crate::bridge::FileSelection::Cancelled).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The host could not present the dialog at all
    #[error("{operation} dialog failed: {reason}")]
    Dialog {
        operation: &'static str,
        reason: String,
    },

    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be read to completion
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File is empty: {}", .path.display())]
    EmptyFile { path: PathBuf },

    /// The payload or its MIME type cannot form a valid data URI
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BridgeError {
    pub(crate) fn dialog(operation: &'static str, reason: impl Into<String>) -> Self {
        BridgeError::Dialog {
            operation,
            reason: reason.into(),
        }
    }

    /// Maps an I/O failure on `path` to the matching variant.
    pub(crate) fn from_read(path: &std::path::Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            BridgeError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BridgeError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
