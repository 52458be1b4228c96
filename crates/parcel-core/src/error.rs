//! Error types for value conversion and address parsing.

use thiserror::Error;

/// Result type for typed value conversions.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// A typed value could not be read as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value's variant has no conversion to the target, or the value
    /// does not fit in it.
    #[error("cannot convert from {from} to {to}")]
    Invalid {
        from: &'static str,
        to: &'static str,
    },
}

/// Errors produced when parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address has no name component.
    #[error("address name is empty")]
    EmptyName,
}
