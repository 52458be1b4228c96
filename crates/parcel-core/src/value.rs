//! Typed values for message properties and structured content.
//!
//! [`TypedValue`] is a closed set of the kinds a message can carry:
//! - fixed-width integers, signed and unsigned, each kept as its own variant
//! - 32 and 64 bit floats
//! - characters, strings, raw binary and UUIDs
//! - nested [`List`]s and string-keyed [`Map`]s
//!
//! The variant tag is part of the value: `UInt16(5)` and `Int32(5)` are not
//! equal, and the content codec keeps the tag across a round trip.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConversionError, ConversionResult};

/// String-keyed mapping of typed values.
///
/// Keys are ordered so that encoding a map is deterministic.
pub type Map = BTreeMap<String, TypedValue>;

/// Ordered sequence of typed values.
pub type List = Vec<TypedValue>;

/// A value tagged with its exact kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    /// Explicit absence of a value.
    #[default]
    #[serde(rename = "void")]
    Null,
    #[serde(rename = "bool")]
    Bool(bool),
    #[serde(rename = "uint8")]
    UInt8(u8),
    #[serde(rename = "uint16")]
    UInt16(u16),
    #[serde(rename = "uint32")]
    UInt32(u32),
    #[serde(rename = "uint64")]
    UInt64(u64),
    #[serde(rename = "int8")]
    Int8(i8),
    #[serde(rename = "int16")]
    Int16(i16),
    #[serde(rename = "int32")]
    Int32(i32),
    #[serde(rename = "int64")]
    Int64(i64),
    #[serde(rename = "float")]
    Float32(f32),
    #[serde(rename = "double")]
    Float64(f64),
    /// A Unicode scalar value. Distinct from `Int32` even though both are
    /// four octets on the wire.
    #[serde(rename = "char")]
    Char(char),
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "uuid")]
    Uuid(Uuid),
    #[serde(rename = "binary")]
    Binary(Vec<u8>),
    #[serde(rename = "list")]
    List(List),
    #[serde(rename = "map")]
    Map(Map),
}

macro_rules! integer_accessor {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $target:literal) => {
        $(#[$doc])*
        pub fn $name(&self) -> ConversionResult<$ty> {
            if let Some(wide) = self.as_integer() {
                return <$ty>::try_from(wide).map_err(|_| self.invalid($target));
            }
            match self {
                Self::String(s) => s.trim().parse::<$ty>().map_err(|_| self.invalid($target)),
                _ => Err(self.invalid($target)),
            }
        }
    };
}

impl TypedValue {
    /// Returns the name of this value's kind, as used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "void",
            Self::Bool(_) => "bool",
            Self::UInt8(_) => "uint8",
            Self::UInt16(_) => "uint16",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Float32(_) => "float",
            Self::Float64(_) => "double",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Uuid(_) => "uuid",
            Self::Binary(_) => "binary",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns true for [`TypedValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for a map or a list.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Map(_) | Self::List(_))
    }

    fn invalid(&self, to: &'static str) -> ConversionError {
        ConversionError::Invalid {
            from: self.type_name(),
            to,
        }
    }

    /// Widens any integer variant; `None` for everything else.
    fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::UInt8(v) => Some(v.into()),
            Self::UInt16(v) => Some(v.into()),
            Self::UInt32(v) => Some(v.into()),
            Self::UInt64(v) => Some(v.into()),
            Self::Int8(v) => Some(v.into()),
            Self::Int16(v) => Some(v.into()),
            Self::Int32(v) => Some(v.into()),
            Self::Int64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Reads the value as a boolean.
    ///
    /// Integers are true when non-zero; strings must be `true` or `false`
    /// (any case).
    pub fn as_bool(&self) -> ConversionResult<bool> {
        if let Some(wide) = self.as_integer() {
            return Ok(wide != 0);
        }
        match self {
            Self::Bool(b) => Ok(*b),
            Self::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
            Self::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(self.invalid("bool")),
        }
    }

    integer_accessor!(
        /// Reads the value as `u8` if it fits.
        as_u8, u8, "uint8"
    );
    integer_accessor!(
        /// Reads the value as `u16` if it fits.
        as_u16, u16, "uint16"
    );
    integer_accessor!(
        /// Reads the value as `u32` if it fits.
        as_u32, u32, "uint32"
    );
    integer_accessor!(
        /// Reads the value as `u64` if it fits.
        as_u64, u64, "uint64"
    );
    integer_accessor!(
        /// Reads the value as `i8` if it fits.
        as_i8, i8, "int8"
    );
    integer_accessor!(
        /// Reads the value as `i16` if it fits.
        as_i16, i16, "int16"
    );
    integer_accessor!(
        /// Reads the value as `i32` if it fits.
        as_i32, i32, "int32"
    );
    integer_accessor!(
        /// Reads the value as `i64` if it fits.
        as_i64, i64, "int64"
    );

    /// Reads the value as `f32`. Doubles and integers are cast.
    pub fn as_f32(&self) -> ConversionResult<f32> {
        if let Some(wide) = self.as_integer() {
            return Ok(wide as f32);
        }
        match self {
            Self::Float32(v) => Ok(*v),
            Self::Float64(v) => Ok(*v as f32),
            Self::String(s) => s.trim().parse().map_err(|_| self.invalid("float")),
            _ => Err(self.invalid("float")),
        }
    }

    /// Reads the value as `f64`. Floats are widened and integers cast.
    pub fn as_f64(&self) -> ConversionResult<f64> {
        if let Some(wide) = self.as_integer() {
            return Ok(wide as f64);
        }
        match self {
            Self::Float32(v) => Ok(f64::from(*v)),
            Self::Float64(v) => Ok(*v),
            Self::String(s) => s.trim().parse().map_err(|_| self.invalid("double")),
            _ => Err(self.invalid("double")),
        }
    }

    /// Reads the value as a character. Integers holding a valid Unicode
    /// scalar value are accepted.
    pub fn as_char(&self) -> ConversionResult<char> {
        if let Some(wide) = self.as_integer() {
            return u32::try_from(wide)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| self.invalid("char"));
        }
        match self {
            Self::Char(c) => Ok(*c),
            _ => Err(self.invalid("char")),
        }
    }

    /// Borrows the string payload.
    pub fn as_str(&self) -> ConversionResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(self.invalid("string")),
        }
    }

    /// Borrows the raw bytes of a binary or string value.
    pub fn as_bytes(&self) -> ConversionResult<&[u8]> {
        match self {
            Self::Binary(b) => Ok(b),
            Self::String(s) => Ok(s.as_bytes()),
            _ => Err(self.invalid("binary")),
        }
    }

    /// Reads the UUID payload.
    pub fn as_uuid(&self) -> ConversionResult<Uuid> {
        match self {
            Self::Uuid(u) => Ok(*u),
            _ => Err(self.invalid("uuid")),
        }
    }

    /// Borrows the nested map.
    pub fn as_map(&self) -> ConversionResult<&Map> {
        match self {
            Self::Map(m) => Ok(m),
            _ => Err(self.invalid("map")),
        }
    }

    /// Borrows the nested list.
    pub fn as_list(&self) -> ConversionResult<&List> {
        match self {
            Self::List(l) => Ok(l),
            _ => Err(self.invalid("list")),
        }
    }

    /// Takes the nested map out of the value.
    pub fn into_map(self) -> ConversionResult<Map> {
        match self {
            Self::Map(m) => Ok(m),
            other => Err(other.invalid("map")),
        }
    }

    /// Takes the nested list out of the value.
    pub fn into_list(self) -> ConversionResult<List> {
        match self {
            Self::List(l) => Ok(l),
            other => Err(other.invalid("list")),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::String(s) => f.write_str(s),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Binary(b) => f.write_str(&String::from_utf8_lossy(b)),
            Self::List(list) => {
                f.write_str("[")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}:{item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TypedValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

from_primitive! {
    bool => Bool,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    char => Char,
    String => String,
    Uuid => Uuid,
    Vec<u8> => Binary,
    List => List,
    Map => Map,
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&[u8]> for TypedValue {
    fn from(v: &[u8]) -> Self {
        Self::Binary(v.to_vec())
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl FromIterator<TypedValue> for TypedValue {
    fn from_iter<I: IntoIterator<Item = TypedValue>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, TypedValue)> for TypedValue {
    fn from_iter<I: IntoIterator<Item = (K, TypedValue)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_keep_their_width() {
        assert_ne!(TypedValue::from(5u16), TypedValue::from(5i32));
        assert_ne!(TypedValue::from('h'), TypedValue::from('h' as i32));
        assert_eq!(TypedValue::from(5u16), TypedValue::UInt16(5));
    }

    #[test]
    fn option_maps_none_to_null() {
        let none: Option<i32> = None;
        assert!(TypedValue::from(none).is_null());
        assert_eq!(TypedValue::from(Some("x")), TypedValue::String("x".into()));
    }

    #[test]
    fn integer_conversion_checks_range() {
        assert_eq!(TypedValue::UInt16(200).as_u8(), Ok(200));
        assert_eq!(
            TypedValue::UInt16(300).as_u8(),
            Err(ConversionError::Invalid {
                from: "uint16",
                to: "uint8"
            })
        );
        assert!(TypedValue::Int8(-1).as_u64().is_err());
        assert_eq!(TypedValue::Int8(-1).as_i64(), Ok(-1));
        assert_eq!(TypedValue::UInt64(u64::MAX).as_u64(), Ok(u64::MAX));
        assert!(TypedValue::UInt64(u64::MAX).as_i64().is_err());
    }

    #[test]
    fn string_parses_into_numbers() {
        assert_eq!(TypedValue::from(" 42 ").as_u32(), Ok(42));
        assert!(TypedValue::from("forty-two").as_u32().is_err());
        assert_eq!(TypedValue::from("1.5").as_f64(), Ok(1.5));
        assert_eq!(TypedValue::from("TRUE").as_bool(), Ok(true));
    }

    #[test]
    fn float_conversions() {
        assert_eq!(TypedValue::Float32(12.12).as_f32(), Ok(12.12));
        assert_eq!(TypedValue::Int32(3).as_f64(), Ok(3.0));
        assert!(TypedValue::Null.as_f64().is_err());
    }

    #[test]
    fn char_conversions() {
        assert_eq!(TypedValue::Char('h').as_char(), Ok('h'));
        assert_eq!(TypedValue::Int32(104).as_char(), Ok('h'));
        assert!(TypedValue::Int32(-1).as_char().is_err());
        assert!(TypedValue::UInt32(0xD800).as_char().is_err());
    }

    #[test]
    fn structured_accessors() {
        let list: TypedValue = vec![TypedValue::from("red"), TypedValue::Null]
            .into_iter()
            .collect();
        assert_eq!(list.as_list().map(Vec::len), Ok(2));
        assert!(list.as_map().is_err());
        assert!(list.is_structured());

        let map: TypedValue = [("name", TypedValue::from("Smith"))].into_iter().collect();
        let inner = map.into_map().unwrap();
        assert_eq!(inner["name"].as_str(), Ok("Smith"));
    }

    #[test]
    fn bytes_accessor_accepts_strings() {
        assert_eq!(TypedValue::from("ab").as_bytes(), Ok(&b"ab"[..]));
        assert_eq!(TypedValue::from(vec![1u8, 2]).as_bytes(), Ok(&[1u8, 2][..]));
        assert!(TypedValue::Bool(true).as_bytes().is_err());
    }

    #[test]
    fn type_names() {
        assert_eq!(TypedValue::Null.type_name(), "void");
        assert_eq!(TypedValue::Float32(0.0).type_name(), "float");
        assert_eq!(TypedValue::Map(Map::new()).type_name(), "map");
    }

    #[test]
    fn display_nested_values() {
        let mut inner = Map::new();
        inner.insert("name".into(), "Smith".into());
        inner.insert("number".into(), 354i32.into());

        let mut outer = Map::new();
        outer.insert("colors".into(), TypedValue::List(vec!["red".into(), TypedValue::Null]));
        outer.insert("nested".into(), TypedValue::Map(inner));
        outer.insert("ok".into(), true.into());

        insta::assert_snapshot!(
            TypedValue::Map(outer).to_string(),
            @"{colors:[red, null], nested:{name:Smith, number:354}, ok:true}"
        );
    }

    #[test]
    fn display_uuid_is_hyphenated() {
        let uuid = Uuid::from_bytes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(
            TypedValue::Uuid(uuid).to_string(),
            "00010203-0405-0607-0809-0a0b0c0d0e0f"
        );
    }

    #[test]
    fn serde_keeps_variant_tags() {
        let value = TypedValue::List(vec![
            TypedValue::UInt16(5),
            TypedValue::Int16(5),
            TypedValue::Null,
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"list":[{"uint16":5},{"int16":5},"void"]}"#);

        let parsed: TypedValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }
}
