//! Message error types.

use parcel_codec::{DecodeError, EncodeError};
use thiserror::Error;

/// Result type for message operations.
pub type MessageResult<T> = Result<T, MessageError>;

/// Errors that can occur while building, reading or framing a message.
#[derive(Debug, Error)]
pub enum MessageError {
    /// A slice or field value lies outside its permitted range.
    #[error("{what} out of range: {detail}")]
    Range { what: &'static str, detail: String },

    /// Destination buffer cannot hold the content.
    #[error("buffer too small: need {needed} bytes, got {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Content is not in the requested form.
    #[error("content type mismatch: expected {expected}, content type is {content_type:?}")]
    TypeMismatch {
        expected: &'static str,
        content_type: String,
    },

    /// Structured content could not be encoded.
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    /// Content could not be decoded, either as structured content or, for
    /// [`Message::content`](crate::Message::content), as UTF-8 text.
    #[error("decoding failed: {0}")]
    Decoding(#[from] DecodeError),

    /// A frame header field is missing its expected type.
    #[error("invalid header field {field}: expected {expected}, found {found}")]
    InvalidHeader {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Frame exceeds the configured size limit.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Input ended before a full frame was available.
    #[error("incomplete message: expected {expected} bytes, got {received}")]
    IncompleteMessage { expected: usize, received: usize },

    /// Zero-length frame.
    #[error("empty message")]
    EmptyMessage,

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MessageError {
    /// Creates a range error.
    pub fn range(what: &'static str, detail: impl Into<String>) -> Self {
        Self::Range {
            what,
            detail: detail.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &'static str, content_type: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            content_type: content_type.into(),
        }
    }
}
