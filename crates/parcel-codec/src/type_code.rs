//! One-octet type codes that prefix every encoded value.

use parcel_core::TypedValue;

/// Type code of an encoded value.
///
/// The high nibble of a fixed-width code gives its body width:
/// `0x0_` one octet, `0x1_` two, `0x2_` four, `0x3_` eight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeCode {
    Int8 = 0x01,
    UInt8 = 0x02,
    Bool = 0x08,
    Int16 = 0x11,
    UInt16 = 0x12,
    Int32 = 0x21,
    UInt32 = 0x22,
    Float32 = 0x23,
    Char = 0x27,
    Int64 = 0x31,
    UInt64 = 0x32,
    Float64 = 0x33,
    Uuid = 0x48,
    /// UTF-8 text with a 16-bit length prefix.
    Str16 = 0x95,
    /// Raw bytes with a 32-bit length prefix.
    Vbin32 = 0xa0,
    Map = 0xa8,
    List = 0xa9,
    Void = 0xf0,
}

impl TypeCode {
    /// Returns the code used to encode `value`.
    pub fn of(value: &TypedValue) -> Self {
        match value {
            TypedValue::Null => Self::Void,
            TypedValue::Bool(_) => Self::Bool,
            TypedValue::UInt8(_) => Self::UInt8,
            TypedValue::UInt16(_) => Self::UInt16,
            TypedValue::UInt32(_) => Self::UInt32,
            TypedValue::UInt64(_) => Self::UInt64,
            TypedValue::Int8(_) => Self::Int8,
            TypedValue::Int16(_) => Self::Int16,
            TypedValue::Int32(_) => Self::Int32,
            TypedValue::Int64(_) => Self::Int64,
            TypedValue::Float32(_) => Self::Float32,
            TypedValue::Float64(_) => Self::Float64,
            TypedValue::Char(_) => Self::Char,
            TypedValue::String(_) => Self::Str16,
            TypedValue::Uuid(_) => Self::Uuid,
            TypedValue::Binary(_) => Self::Vbin32,
            TypedValue::List(_) => Self::List,
            TypedValue::Map(_) => Self::Map,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TypeCode {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        let tc = match code {
            0x01 => Self::Int8,
            0x02 => Self::UInt8,
            0x08 => Self::Bool,
            0x11 => Self::Int16,
            0x12 => Self::UInt16,
            0x21 => Self::Int32,
            0x22 => Self::UInt32,
            0x23 => Self::Float32,
            0x27 => Self::Char,
            0x31 => Self::Int64,
            0x32 => Self::UInt64,
            0x33 => Self::Float64,
            0x48 => Self::Uuid,
            0x95 => Self::Str16,
            0xa0 => Self::Vbin32,
            0xa8 => Self::Map,
            0xa9 => Self::List,
            0xf0 => Self::Void,
            other => return Err(other),
        };
        Ok(tc)
    }
}
