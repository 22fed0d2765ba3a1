//! Protocol error types.

use thiserror::Error;

/// Errors produced by the wire codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A value does not fit the fixed-width field it is encoded into.
    #[error("{field} out of range: {value} (max {max})")]
    Range {
        /// Name of the field being encoded.
        field: &'static str,
        /// Offending value.
        value: i64,
        /// Largest representable value.
        max: i64,
    },

    /// Frame is too short for the feature's layout.
    #[error("malformed payload: expected at least {expected} bytes, got {actual}")]
    MalformedPayload {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Frame carries a different feature tag than the decoder expects.
    #[error("unexpected tag: expected 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedTag {
        /// Tag the decoder handles.
        expected: u8,
        /// Tag found in the frame.
        actual: u8,
    },

    /// Invalid data in a frame or value.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ProtocolError {
    /// Shorthand for a too-short frame.
    pub(crate) fn too_short(expected: usize, actual: usize) -> Self {
        ProtocolError::MalformedPayload { expected, actual }
    }
}

/// Result type alias for codec operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
