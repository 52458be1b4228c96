//! Codec error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for encoding.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while turning typed values into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Only maps and lists can be encoded as content.
    #[error("cannot encode {type_name} as content: expected map or list")]
    NotStructured { type_name: &'static str },

    /// String value does not fit a str16.
    #[error("string too long: {len} bytes (max: {max})")]
    StringTooLong { len: usize, max: usize },

    /// Map key does not fit a str8.
    #[error("map key too long: {len} bytes (max: {max})")]
    KeyTooLong { len: usize, max: usize },

    /// Binary value, collection or entry count overflows a 32-bit field.
    #[error("{what} too large: {size} bytes")]
    TooLarge { what: &'static str, size: usize },

    /// Encoded content exceeds the configured limit.
    #[error("content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: usize, max: usize },

    /// Collections are nested deeper than the configured limit.
    #[error("nesting deeper than {max} levels")]
    DepthExceeded { max: usize },
}

/// Errors raised while reading typed values from bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before a complete value was read.
    #[error("truncated {context} at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Type code is not one this codec understands.
    #[error("unknown type code {code:#04x} at offset {offset}")]
    UnknownTypeCode { code: u8, offset: usize },

    /// String or key bytes are not UTF-8.
    #[error("invalid UTF-8 in {context} at offset {offset}")]
    InvalidUtf8 {
        context: &'static str,
        offset: usize,
    },

    /// Char value is not a Unicode scalar value.
    #[error("invalid char value {value:#x} at offset {offset}")]
    InvalidChar { value: u32, offset: usize },

    /// A collection's entries did not fill exactly its declared size.
    #[error("{context} size mismatch at offset {offset}: declared {declared} bytes, entries used {actual}")]
    SizeMismatch {
        context: &'static str,
        offset: usize,
        declared: usize,
        actual: usize,
    },

    /// Bytes left over after the top-level value.
    #[error("{count} trailing bytes after content")]
    TrailingBytes { count: usize },

    /// Content exceeds the configured limit.
    #[error("content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: usize, max: usize },

    /// Collections are nested deeper than the configured limit.
    #[error("nesting deeper than {max} levels")]
    DepthExceeded { max: usize },
}

/// Errors loading codec configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has wrongly typed fields.
    #[error("invalid codec configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A limit has an unusable value.
    #[error("invalid codec configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// Creates an invalid-value error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
