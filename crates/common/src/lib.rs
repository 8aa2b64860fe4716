//! Common types and utilities for postman-sync
//!
//! This crate contains the shared error type, the operation and credential
//! types, and the collection envelope normalizer used by the converter,
//! client, sync and CLI components.

pub mod document;
mod operation;
mod secret;

pub use document::{is_enveloped, normalize, CollectionSummary, ARTIFACT_FILE_NAME};
pub use operation::Operation;
pub use secret::ApiKey;

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used to carry underlying causes across crate boundaries
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while converting or synchronizing a collection
#[derive(Error, Debug)]
pub enum SyncError {
    /// External converter failed or wrote to its diagnostic stream
    #[error("{message}: {data}")]
    Process { message: String, data: String },

    /// Working artifact could not be created or serialized
    #[error("{message}")]
    Write {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Collection artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Operation '{operation}' requires a collection identifier")]
    MissingIdentifier { operation: Operation },

    #[error("Unknown operation: {operation}")]
    UnknownOperation { operation: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Build a [`SyncError::Process`]
    pub fn process(message: impl Into<String>, data: impl Into<String>) -> Self {
        SyncError::Process {
            message: message.into(),
            data: data.into(),
        }
    }

    /// Build a [`SyncError::Write`] wrapping the underlying failure
    pub fn write(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        SyncError::Write {
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Failure reported by the remote collection API
#[derive(Error, Debug)]
#[error("{message}: {cause}")]
pub struct RemoteError {
    pub message: String,
    #[source]
    pub cause: RemoteCause,
}

impl RemoteError {
    pub fn new(message: impl Into<String>, cause: RemoteCause) -> Self {
        Self {
            message: message.into(),
            cause,
        }
    }

    /// HTTP status of the failed response, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match &self.cause {
            RemoteCause::Status { status, .. } => Some(*status),
            RemoteCause::Transport(_) => None,
        }
    }
}

/// Underlying reason a remote call failed
#[derive(Error, Debug)]
pub enum RemoteCause {
    /// Connection, TLS or body decoding failure, kept as reported by the HTTP client
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },
}

/// Result type for postman-sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
