//! Core types: typed values, addresses, durations, tracing

pub mod address;
pub mod duration;
pub mod error;
pub mod tracing;
pub mod value;

pub use address::Address;
pub use duration::Duration;
pub use error::{AddressError, ConversionError, ConversionResult};
pub use crate::tracing::{
    init_test_tracing, init_tracing, TracingConfig, TracingError, TracingOutputFormat,
};
pub use uuid::Uuid;
pub use value::{List, Map, TypedValue};
