//! Structured content encoding for parcel messages.
//!
//! A message whose content is a [`Map`](parcel_core::Map) or a
//! [`List`](parcel_core::List) of typed values carries that content as bytes
//! produced by [`ContentCodec`]. The encoding keeps every value's exact
//! kind, so a `uint16` comes back as a `uint16` and nulls keep their place.
//!
//! # Wire format
//!
//! All integers are big-endian. A value is a one-octet type code followed by
//! its body (see [`TypeCode`]). Collections look like:
//!
//! ```text
//! map:  | size (u32) | count (u32) | key (str8) type value | ... |
//! list: | size (u32) | count (u32) | type value | ...             |
//! ```
//!
//! `size` counts every byte after the size field itself. Top-level content
//! is a bare map or list body, without a leading type code.
//!
//! # Example
//!
//! ```rust
//! use parcel_codec::{decode_map, encode_map};
//! use parcel_core::{Map, TypedValue};
//!
//! let mut map = Map::new();
//! map.insert("count".to_string(), TypedValue::UInt16(5));
//! let bytes = encode_map(&map).unwrap();
//! assert_eq!(decode_map(&bytes).unwrap(), map);
//! ```

mod codec;
mod config;
mod error;
mod reader;
mod type_code;

pub use codec::{
    decode, decode_list, decode_map, encode, encode_list, encode_map, ContentCodec, Shape,
};
pub use config::{
    CodecLimits, DEFAULT_MAX_CONTENT_SIZE, DEFAULT_MAX_DEPTH, DEFAULT_MAX_FRAME_SIZE,
    MAX_DEPTH_LIMIT,
};
pub use error::{ConfigError, DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use type_code::TypeCode;

/// Content type of a message carrying an encoded map.
pub const MAP_CONTENT_TYPE: &str = "amqp/map";

/// Content type of a message carrying an encoded list.
pub const LIST_CONTENT_TYPE: &str = "amqp/list";

/// Longest string value, in bytes (str16).
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Longest map key, in bytes (str8).
pub const MAX_KEY_LEN: usize = u8::MAX as usize;
