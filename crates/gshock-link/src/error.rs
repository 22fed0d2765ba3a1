//! Error types for the link layer.

use std::time::Duration;

use gshock_protocol::ProtocolError;
use thiserror::Error;

use crate::types::FeatureId;

/// Failures reported by the [`Connection`](crate::Connection) collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The link to the watch is gone.
    #[error("watch disconnected")]
    Disconnected,

    /// A characteristic write was not acknowledged.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A read request could not be issued.
    #[error("read request failed: {0}")]
    RequestFailed(String),
}

/// Why an outstanding correlated request ended without a value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PendingError {
    /// Cancelled explicitly, e.g. on disconnect.
    #[error("request cancelled: {0}")]
    Cancelled(String),

    /// No reply arrived within the allowed time.
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced to callers of the dispatcher.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The action name has no registered sender.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A correlated request for this feature is already outstanding.
    #[error("a {0} request is already pending")]
    AlreadyPending(FeatureId),

    /// The feature does not implement the requested operation.
    #[error("{feature} does not support {operation}")]
    Unsupported {
        /// Feature that was asked.
        feature: FeatureId,
        /// Operation name.
        operation: &'static str,
    },

    /// The characteristic table has no entry for a required name.
    #[error("unknown characteristic: {0}")]
    UnknownCharacteristic(String),

    /// The application message does not have the shape the action expects.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Encoding or decoding failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The transport rejected a write or request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A correlated request was cancelled or timed out.
    #[error(transparent)]
    Pending(#[from] PendingError),
}

/// Result type alias for link operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors loading a [`LinkConfig`](crate::LinkConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML did not match the expected shape.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
