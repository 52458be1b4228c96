//! Encoding and decoding of structured content.

use parcel_core::{List, Map, TypedValue, Uuid};
use tracing::{debug, trace};

use crate::config::{CodecLimits, MAX_DEPTH_LIMIT};
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::reader::Reader;
use crate::type_code::TypeCode;
use crate::{LIST_CONTENT_TYPE, MAP_CONTENT_TYPE, MAX_KEY_LEN, MAX_STRING_LEN};

/// The top-level form of structured content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Map,
    List,
}

impl Shape {
    /// Message content type announcing this shape.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Map => MAP_CONTENT_TYPE,
            Self::List => LIST_CONTENT_TYPE,
        }
    }

    /// Recognizes `amqp/map` and `amqp/list`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            MAP_CONTENT_TYPE => Some(Self::Map),
            LIST_CONTENT_TYPE => Some(Self::List),
            _ => None,
        }
    }

    /// Shape of a value, if it is structured.
    pub fn of(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Map(_) => Some(Self::Map),
            TypedValue::List(_) => Some(Self::List),
            _ => None,
        }
    }
}

/// Converts between typed maps/lists and their byte encoding.
#[derive(Debug, Clone, Default)]
pub struct ContentCodec {
    limits: CodecLimits,
}

impl ContentCodec {
    /// Creates a codec enforcing the given limits.
    pub fn new(limits: CodecLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Encodes a map or list value.
    ///
    /// Encoding is deterministic: the same value always yields the same
    /// bytes.
    pub fn encode(&self, value: &TypedValue) -> EncodeResult<Vec<u8>> {
        match value {
            TypedValue::Map(map) => self.encode_map(map),
            TypedValue::List(list) => self.encode_list(list),
            other => Err(EncodeError::NotStructured {
                type_name: other.type_name(),
            }),
        }
    }

    pub fn encode_map(&self, map: &Map) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_map(&mut out, map, 1)?;
        self.finish_encode(out, Shape::Map)
    }

    pub fn encode_list(&self, list: &List) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_list(&mut out, list, 1)?;
        self.finish_encode(out, Shape::List)
    }

    /// Decodes content of the expected shape.
    pub fn decode(&self, bytes: &[u8], shape: Shape) -> DecodeResult<TypedValue> {
        match shape {
            Shape::Map => self.decode_map(bytes).map(TypedValue::Map),
            Shape::List => self.decode_list(bytes).map(TypedValue::List),
        }
    }

    pub fn decode_map(&self, bytes: &[u8]) -> DecodeResult<Map> {
        self.decode_with(bytes, Shape::Map, |codec, reader| codec.read_map(reader, 1))
    }

    pub fn decode_list(&self, bytes: &[u8]) -> DecodeResult<List> {
        self.decode_with(bytes, Shape::List, |codec, reader| codec.read_list(reader, 1))
    }

    fn finish_encode(&self, out: Vec<u8>, shape: Shape) -> EncodeResult<Vec<u8>> {
        if out.len() > self.limits.max_content_size {
            return Err(EncodeError::ContentTooLarge {
                size: out.len(),
                max: self.limits.max_content_size,
            });
        }
        trace!(bytes = out.len(), ?shape, "encoded content");
        Ok(out)
    }

    fn decode_with<T>(
        &self,
        bytes: &[u8],
        shape: Shape,
        read: impl FnOnce(&Self, &mut Reader<'_>) -> DecodeResult<T>,
    ) -> DecodeResult<T> {
        if bytes.len() > self.limits.max_content_size {
            return Err(DecodeError::ContentTooLarge {
                size: bytes.len(),
                max: self.limits.max_content_size,
            });
        }

        let mut reader = Reader::new(bytes);
        let value = read(self, &mut reader).inspect_err(|err| {
            debug!(%err, ?shape, bytes = bytes.len(), "rejected content");
        })?;

        if reader.remaining() > 0 {
            debug!(trailing = reader.remaining(), ?shape, "rejected content");
            return Err(DecodeError::TrailingBytes {
                count: reader.remaining(),
            });
        }

        trace!(bytes = bytes.len(), ?shape, "decoded content");
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    /// Configured depth, bounded so recursion always stays on the stack.
    /// One level above [`MAX_DEPTH_LIMIT`] is left for message frame headers.
    fn max_depth(&self) -> usize {
        self.limits.max_depth.min(MAX_DEPTH_LIMIT + 1)
    }

    fn check_encode_depth(&self, depth: usize) -> EncodeResult<()> {
        let max = self.max_depth();
        if depth > max {
            return Err(EncodeError::DepthExceeded { max });
        }
        Ok(())
    }

    /// Writes `size | count | body`, back-filling size once the body is known.
    fn write_sized(
        out: &mut Vec<u8>,
        what: &'static str,
        count: usize,
        body: impl FnOnce(&mut Vec<u8>) -> EncodeResult<()>,
    ) -> EncodeResult<()> {
        let count =
            u32::try_from(count).map_err(|_| EncodeError::TooLarge { what, size: count })?;

        let start = out.len();
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&count.to_be_bytes());
        body(out)?;

        let size = out.len() - start - 4;
        let size32 = u32::try_from(size).map_err(|_| EncodeError::TooLarge { what, size })?;
        out[start..start + 4].copy_from_slice(&size32.to_be_bytes());
        Ok(())
    }

    fn write_map(&self, out: &mut Vec<u8>, map: &Map, depth: usize) -> EncodeResult<()> {
        self.check_encode_depth(depth)?;
        Self::write_sized(out, "map", map.len(), |out| {
            for (key, value) in map {
                if key.len() > MAX_KEY_LEN {
                    return Err(EncodeError::KeyTooLong {
                        len: key.len(),
                        max: MAX_KEY_LEN,
                    });
                }
                out.push(key.len() as u8);
                out.extend_from_slice(key.as_bytes());
                self.write_value(out, value, depth)?;
            }
            Ok(())
        })
    }

    fn write_list(&self, out: &mut Vec<u8>, list: &List, depth: usize) -> EncodeResult<()> {
        self.check_encode_depth(depth)?;
        Self::write_sized(out, "list", list.len(), |out| {
            for value in list {
                self.write_value(out, value, depth)?;
            }
            Ok(())
        })
    }

    fn write_value(&self, out: &mut Vec<u8>, value: &TypedValue, depth: usize) -> EncodeResult<()> {
        out.push(TypeCode::of(value).as_u8());
        match value {
            TypedValue::Null => {}
            TypedValue::Bool(v) => out.push(u8::from(*v)),
            TypedValue::UInt8(v) => out.push(*v),
            TypedValue::UInt16(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::UInt32(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::UInt64(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::Int8(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::Int16(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::Int32(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::Int64(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::Float32(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::Float64(v) => out.extend_from_slice(&v.to_be_bytes()),
            TypedValue::Char(c) => out.extend_from_slice(&u32::from(*c).to_be_bytes()),
            TypedValue::String(s) => {
                let len = u16::try_from(s.len()).map_err(|_| EncodeError::StringTooLong {
                    len: s.len(),
                    max: MAX_STRING_LEN,
                })?;
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            TypedValue::Uuid(u) => out.extend_from_slice(u.as_bytes()),
            TypedValue::Binary(b) => {
                let len = u32::try_from(b.len()).map_err(|_| EncodeError::TooLarge {
                    what: "binary",
                    size: b.len(),
                })?;
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(b);
            }
            TypedValue::List(list) => self.write_list(out, list, depth + 1)?,
            TypedValue::Map(map) => self.write_map(out, map, depth + 1)?,
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    fn check_decode_depth(&self, depth: usize) -> DecodeResult<()> {
        let max = self.max_depth();
        if depth > max {
            return Err(DecodeError::DepthExceeded { max });
        }
        Ok(())
    }

    /// Reads `size | count` and returns a reader confined to the body.
    fn read_header<'a>(
        reader: &mut Reader<'a>,
        context: &'static str,
    ) -> DecodeResult<(Reader<'a>, usize)> {
        let size = reader.u32(context)? as usize;
        let mut body = reader.sub_reader(size, context)?;
        let count = body.u32(context)? as usize;
        Ok((body, count))
    }

    fn finish_body(body: &Reader<'_>, context: &'static str) -> DecodeResult<()> {
        if body.remaining() != 0 {
            return Err(DecodeError::SizeMismatch {
                context,
                offset: body.start(),
                declared: body.consumed() + body.remaining(),
                actual: body.consumed(),
            });
        }
        Ok(())
    }

    fn read_map(&self, reader: &mut Reader<'_>, depth: usize) -> DecodeResult<Map> {
        self.check_decode_depth(depth)?;
        let (mut body, count) = Self::read_header(reader, "map")?;

        let mut map = Map::new();
        for _ in 0..count {
            let key = Self::read_key(&mut body)?;
            let value = self.read_value(&mut body, depth)?;
            map.insert(key, value);
        }

        Self::finish_body(&body, "map")?;
        Ok(map)
    }

    fn read_list(&self, reader: &mut Reader<'_>, depth: usize) -> DecodeResult<List> {
        self.check_decode_depth(depth)?;
        let (mut body, count) = Self::read_header(reader, "list")?;

        // Every entry takes at least one byte, so the body bounds the count.
        let mut list = List::with_capacity(count.min(body.remaining()));
        for _ in 0..count {
            list.push(self.read_value(&mut body, depth)?);
        }

        Self::finish_body(&body, "list")?;
        Ok(list)
    }

    fn read_key(reader: &mut Reader<'_>) -> DecodeResult<String> {
        let len = reader.u8("map key length")? as usize;
        let offset = reader.offset();
        let bytes = reader.take(len, "map key")?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 {
                context: "map key",
                offset,
            })
    }

    fn read_value(&self, reader: &mut Reader<'_>, depth: usize) -> DecodeResult<TypedValue> {
        let offset = reader.offset();
        let code = reader.u8("type code")?;
        let type_code = TypeCode::try_from(code)
            .map_err(|code| DecodeError::UnknownTypeCode { code, offset })?;

        let value = match type_code {
            TypeCode::Void => TypedValue::Null,
            TypeCode::Bool => TypedValue::Bool(reader.u8("bool")? != 0),
            TypeCode::UInt8 => TypedValue::UInt8(reader.u8("uint8")?),
            TypeCode::UInt16 => TypedValue::UInt16(reader.u16("uint16")?),
            TypeCode::UInt32 => TypedValue::UInt32(reader.u32("uint32")?),
            TypeCode::UInt64 => TypedValue::UInt64(u64::from_be_bytes(reader.array("uint64")?)),
            TypeCode::Int8 => TypedValue::Int8(i8::from_be_bytes(reader.array("int8")?)),
            TypeCode::Int16 => TypedValue::Int16(i16::from_be_bytes(reader.array("int16")?)),
            TypeCode::Int32 => TypedValue::Int32(i32::from_be_bytes(reader.array("int32")?)),
            TypeCode::Int64 => TypedValue::Int64(i64::from_be_bytes(reader.array("int64")?)),
            TypeCode::Float32 => TypedValue::Float32(f32::from_be_bytes(reader.array("float")?)),
            TypeCode::Float64 => {
                TypedValue::Float64(f64::from_be_bytes(reader.array("double")?))
            }
            TypeCode::Char => {
                let at = reader.offset();
                let raw = reader.u32("char")?;
                let c = char::from_u32(raw)
                    .ok_or(DecodeError::InvalidChar { value: raw, offset: at })?;
                TypedValue::Char(c)
            }
            TypeCode::Uuid => TypedValue::Uuid(Uuid::from_bytes(reader.array("uuid")?)),
            TypeCode::Str16 => {
                let len = reader.u16("string length")? as usize;
                let at = reader.offset();
                let bytes = reader.take(len, "string")?;
                let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
                    context: "string",
                    offset: at,
                })?;
                TypedValue::String(s.to_owned())
            }
            TypeCode::Vbin32 => {
                let len = reader.u32("binary length")? as usize;
                TypedValue::Binary(reader.take(len, "binary")?.to_vec())
            }
            TypeCode::Map => TypedValue::Map(self.read_map(reader, depth + 1)?),
            TypeCode::List => TypedValue::List(self.read_list(reader, depth + 1)?),
        };
        Ok(value)
    }
}

/// Encodes a map or list with default limits.
pub fn encode(value: &TypedValue) -> EncodeResult<Vec<u8>> {
    ContentCodec::default().encode(value)
}

/// Encodes a map with default limits.
pub fn encode_map(map: &Map) -> EncodeResult<Vec<u8>> {
    ContentCodec::default().encode_map(map)
}

/// Encodes a list with default limits.
pub fn encode_list(list: &List) -> EncodeResult<Vec<u8>> {
    ContentCodec::default().encode_list(list)
}

/// Decodes content of the expected shape with default limits.
pub fn decode(bytes: &[u8], shape: Shape) -> DecodeResult<TypedValue> {
    ContentCodec::default().decode(bytes, shape)
}

/// Decodes a map with default limits.
pub fn decode_map(bytes: &[u8]) -> DecodeResult<Map> {
    ContentCodec::default().decode_map(bytes)
}

/// Decodes a list with default limits.
pub fn decode_list(bytes: &[u8]) -> DecodeResult<List> {
    ContentCodec::default().decode_list(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn nested_lists(depth: usize) -> TypedValue {
        let mut value = TypedValue::List(vec![TypedValue::Int32(0)]);
        for _ in 1..depth {
            value = TypedValue::List(vec![value]);
        }
        value
    }

    fn all_types() -> Map {
        let mut sub_map = Map::new();
        sub_map.insert("name".into(), "Smith".into());
        sub_map.insert("number".into(), 354i32.into());

        let colors: List = vec!["red".into(), "green".into(), "white".into(), TypedValue::Null];

        let mut content = Map::new();
        content.insert("id".into(), 987654321i32.into());
        content.insert("name".into(), "Widget".into());
        content.insert("percent".into(), 0.99f64.into());
        content.insert("nestedMap".into(), sub_map.into());
        content.insert("colorsList".into(), colors.into());
        content.insert("mybool".into(), true.into());
        content.insert("mybyte".into(), 4u8.into());
        content.insert("myUInt16".into(), 5u16.into());
        content.insert("myUInt32".into(), 6u32.into());
        content.insert("myUInt64".into(), 7u64.into());
        content.insert("mychar".into(), 'h'.into());
        content.insert("myInt8".into(), (-8i8).into());
        content.insert("myInt16".into(), 9i16.into());
        content.insert("myInt32".into(), 10i32.into());
        content.insert("myInt64".into(), 11i64.into());
        content.insert("mySingle".into(), 12.12f32.into());
        content.insert("myDouble".into(), 13.13f64.into());
        content.insert(
            "myGuid".into(),
            Uuid::from_bytes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]).into(),
        );
        content.insert("myBinary".into(), vec![0u8, 0xff, 0x10].into());
        content.insert("myNull".into(), TypedValue::Null);
        content
    }

    #[test]
    fn all_types_roundtrip_with_exact_tags() {
        let content = all_types();
        let bytes = encode_map(&content).unwrap();
        let decoded = decode_map(&bytes).unwrap();

        assert_eq!(decoded, content);
        assert_eq!(decoded["mybyte"], TypedValue::UInt8(4));
        assert_eq!(decoded["myUInt16"], TypedValue::UInt16(5));
        assert_eq!(decoded["mychar"], TypedValue::Char('h'));
        assert_eq!(decoded["mySingle"], TypedValue::Float32(12.12));
        assert_eq!(decoded["myNull"], TypedValue::Null);
        assert_eq!(
            decoded["myGuid"].to_string(),
            "00010203-0405-0607-0809-0a0b0c0d0e0f"
        );
    }

    #[test]
    fn list_keeps_nulls_in_place() {
        let list: List = vec!["red".into(), TypedValue::Null, "white".into(), TypedValue::Null];
        let decoded = decode_list(&encode_list(&list).unwrap()).unwrap();
        assert_eq!(decoded.len(), 4);
        assert!(decoded[1].is_null());
        assert!(decoded[3].is_null());
        assert_eq!(decoded, list);
    }

    #[test]
    fn nested_map_roundtrip() {
        let content = all_types();
        let decoded = decode(&encode(&TypedValue::Map(content)).unwrap(), Shape::Map).unwrap();
        let sub_map = decoded.as_map().unwrap()["nestedMap"].as_map().unwrap();
        assert_eq!(sub_map["name"].as_str(), Ok("Smith"));
        assert_eq!(sub_map["number"], TypedValue::Int32(354));
    }

    #[test]
    fn deep_nesting_roundtrip() {
        let value = nested_lists(100);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes, Shape::List).unwrap(), value);
    }

    #[test]
    fn empty_collections_roundtrip() {
        assert_eq!(decode_map(&encode_map(&Map::new()).unwrap()).unwrap(), Map::new());
        assert_eq!(decode_list(&encode_list(&List::new()).unwrap()).unwrap(), List::new());
    }

    #[test]
    fn list_wire_bytes() {
        let list: List = vec![TypedValue::Bool(true), TypedValue::UInt8(4)];
        insta::assert_snapshot!(hex(&encode_list(&list).unwrap()), @"000000080000000208010204");
    }

    #[test]
    fn map_wire_bytes() {
        let mut map = Map::new();
        map.insert("a".into(), TypedValue::Null);
        insta::assert_snapshot!(hex(&encode_map(&map).unwrap()), @"00000007000000010161f0");
    }

    #[test]
    fn encoding_is_deterministic() {
        let content = all_types();
        assert_eq!(encode_map(&content).unwrap(), encode_map(&content).unwrap());
    }

    #[test]
    fn encode_rejects_scalar_content() {
        assert_eq!(
            encode(&TypedValue::from("text")),
            Err(EncodeError::NotStructured { type_name: "string" })
        );
    }

    #[test]
    fn encode_rejects_long_string_and_key() {
        let list: List = vec!["x".repeat(MAX_STRING_LEN + 1).into()];
        assert!(matches!(
            encode_list(&list),
            Err(EncodeError::StringTooLong { .. })
        ));

        let mut map = Map::new();
        map.insert("k".repeat(MAX_KEY_LEN + 1), TypedValue::Null);
        assert_eq!(
            encode_map(&map),
            Err(EncodeError::KeyTooLong {
                len: MAX_KEY_LEN + 1,
                max: MAX_KEY_LEN
            })
        );
    }

    #[test]
    fn longest_string_and_key_fit() {
        let mut map = Map::new();
        map.insert("k".repeat(MAX_KEY_LEN), "x".repeat(MAX_STRING_LEN).into());
        let decoded = decode_map(&encode_map(&map).unwrap()).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn depth_limit_applies_both_ways() {
        let shallow = ContentCodec::new(CodecLimits::default().with_max_depth(2));
        let value = nested_lists(3);

        assert_eq!(
            shallow.encode(&value),
            Err(EncodeError::DepthExceeded { max: 2 })
        );

        let bytes = encode(&value).unwrap();
        assert_eq!(
            shallow.decode(&bytes, Shape::List),
            Err(DecodeError::DepthExceeded { max: 2 })
        );
        assert!(shallow.encode(&nested_lists(2)).is_ok());
    }

    #[test]
    fn content_size_limit() {
        let small = ContentCodec::new(CodecLimits::default().with_max_content_size(16));
        let list: List = vec![TypedValue::Binary(vec![0; 32])];
        assert!(matches!(
            small.encode_list(&list),
            Err(EncodeError::ContentTooLarge { max: 16, .. })
        ));

        let bytes = encode_list(&list).unwrap();
        assert!(matches!(
            small.decode_list(&bytes),
            Err(DecodeError::ContentTooLarge { max: 16, .. })
        ));
    }

    #[test]
    fn decode_truncated_header() {
        assert!(matches!(
            decode_map(&[0, 0]),
            Err(DecodeError::Truncated { offset: 0, needed: 4, available: 2, .. })
        ));
        assert!(matches!(
            decode_map(&[0, 0, 0, 8]),
            Err(DecodeError::Truncated { offset: 4, needed: 8, available: 0, .. })
        ));
    }

    #[test]
    fn decode_truncated_value() {
        let mut bytes = encode_list(&vec![TypedValue::UInt64(7)]).unwrap();
        bytes.truncate(bytes.len() - 1);
        // Fix up the declared size so the short value, not the header, fails.
        let size = (bytes.len() - 4) as u32;
        bytes[..4].copy_from_slice(&size.to_be_bytes());
        assert!(matches!(
            decode_list(&bytes),
            Err(DecodeError::Truncated { context: "uint64", .. })
        ));
    }

    #[test]
    fn decode_unknown_type_code() {
        let bytes = [0, 0, 0, 5, 0, 0, 0, 1, 0x04];
        assert_eq!(
            decode_list(&bytes),
            Err(DecodeError::UnknownTypeCode { code: 0x04, offset: 8 })
        );
    }

    #[test]
    fn decode_size_mismatch() {
        let bytes = [0, 0, 0, 6, 0, 0, 0, 1, 0xf0, 0xf0];
        assert_eq!(
            decode_list(&bytes),
            Err(DecodeError::SizeMismatch {
                context: "list",
                offset: 4,
                declared: 6,
                actual: 5,
            })
        );
    }

    #[test]
    fn decode_trailing_bytes() {
        let mut bytes = encode_list(&List::new()).unwrap();
        bytes.push(0);
        assert_eq!(
            decode_list(&bytes),
            Err(DecodeError::TrailingBytes { count: 1 })
        );
    }

    #[test]
    fn decode_invalid_char() {
        let bytes = [0, 0, 0, 9, 0, 0, 0, 1, 0x27, 0, 0, 0xd8, 0];
        assert_eq!(
            decode_list(&bytes),
            Err(DecodeError::InvalidChar { value: 0xd800, offset: 9 })
        );
    }

    #[test]
    fn decode_invalid_utf8() {
        let bytes = [0, 0, 0, 8, 0, 0, 0, 1, 0x95, 0, 1, 0xff];
        assert_eq!(
            decode_list(&bytes),
            Err(DecodeError::InvalidUtf8 { context: "string", offset: 11 })
        );

        let bytes = [0, 0, 0, 7, 0, 0, 0, 1, 1, 0xff, 0xf0];
        assert_eq!(
            decode_map(&bytes),
            Err(DecodeError::InvalidUtf8 { context: "map key", offset: 9 })
        );
    }

    #[test]
    fn decode_huge_count_fails_cleanly() {
        let bytes = [0, 0, 0, 4, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            decode_list(&bytes),
            Err(DecodeError::Truncated { context: "type code", .. })
        ));
    }

    #[test]
    fn nonzero_bool_decodes_true() {
        let bytes = [0, 0, 0, 6, 0, 0, 0, 1, 0x08, 0x02];
        assert_eq!(decode_list(&bytes).unwrap(), vec![TypedValue::Bool(true)]);
    }

    #[test]
    fn shape_content_types() {
        assert_eq!(Shape::from_content_type("amqp/map"), Some(Shape::Map));
        assert_eq!(Shape::from_content_type("amqp/list"), Some(Shape::List));
        assert_eq!(Shape::from_content_type("text/plain"), None);
        assert_eq!(Shape::List.content_type(), LIST_CONTENT_TYPE);
        assert_eq!(Shape::of(&TypedValue::Null), None);
    }

    /// Hand-built nested list bytes, so the encoder's own depth check does
    /// not get in the way.
    fn nested_list_bytes(depth: usize) -> Vec<u8> {
        let mut body = vec![0, 0, 0, 4, 0, 0, 0, 0];
        for _ in 1..depth {
            let mut outer = Vec::with_capacity(body.len() + 9);
            outer.extend_from_slice(&((body.len() + 5) as u32).to_be_bytes());
            outer.extend_from_slice(&1u32.to_be_bytes());
            outer.push(TypeCode::List.as_u8());
            outer.extend_from_slice(&body);
            body = outer;
        }
        body
    }

    #[test]
    fn depth_is_capped_whatever_the_limits_say() {
        let deep = ContentCodec::new(CodecLimits::default().with_max_depth(10_000_000));
        let bytes = nested_list_bytes(2_000);

        assert_eq!(
            deep.decode_list(&bytes),
            Err(DecodeError::DepthExceeded {
                max: MAX_DEPTH_LIMIT + 1
            })
        );
        assert_eq!(decode_list(&nested_list_bytes(128)).map(|l| l.len()), Ok(1));
        assert_eq!(
            decode_list(&nested_list_bytes(129)),
            Err(DecodeError::DepthExceeded { max: 128 })
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;

    fn arb_leaf() -> impl Strategy<Value = TypedValue> {
        prop_oneof![
            Just(TypedValue::Null),
            any::<bool>().prop_map(TypedValue::Bool),
            prop_oneof![
                any::<u8>().prop_map(TypedValue::UInt8),
                any::<u16>().prop_map(TypedValue::UInt16),
                any::<u32>().prop_map(TypedValue::UInt32),
                any::<u64>().prop_map(TypedValue::UInt64),
                any::<i8>().prop_map(TypedValue::Int8),
                any::<i16>().prop_map(TypedValue::Int16),
                any::<i32>().prop_map(TypedValue::Int32),
                any::<i64>().prop_map(TypedValue::Int64),
            ],
            // NaN never compares equal, even to itself.
            prop_oneof![
                any::<f32>()
                    .prop_filter("NaN", |v| !v.is_nan())
                    .prop_map(TypedValue::Float32),
                any::<f64>()
                    .prop_filter("NaN", |v| !v.is_nan())
                    .prop_map(TypedValue::Float64),
            ],
            any::<char>().prop_map(TypedValue::Char),
            "\\PC{0,24}".prop_map(TypedValue::String),
            any::<[u8; 16]>().prop_map(|b| TypedValue::Uuid(Uuid::from_bytes(b))),
            vec(any::<u8>(), 0..32).prop_map(TypedValue::Binary),
        ]
    }

    fn arb_value() -> impl Strategy<Value = TypedValue> {
        arb_leaf().prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                vec(inner.clone(), 0..8).prop_map(TypedValue::List),
                btree_map("[a-zA-Z0-9_]{0,12}", inner, 0..8).prop_map(TypedValue::Map),
            ]
        })
    }

    fn arb_content() -> impl Strategy<Value = TypedValue> {
        prop_oneof![
            vec(arb_value(), 0..8).prop_map(TypedValue::List),
            btree_map("[a-zA-Z0-9_]{0,12}", arb_value(), 0..8).prop_map(TypedValue::Map),
        ]
    }

    proptest! {
        /// Structured content comes back with every tag and null in place.
        #[test]
        fn prop_content_roundtrip(content in arb_content()) {
            let shape = Shape::of(&content).unwrap();
            let bytes = encode(&content).unwrap();
            prop_assert_eq!(decode(&bytes, shape).unwrap(), content);
        }

        /// Encoding the same value twice yields the same bytes.
        #[test]
        fn prop_encoding_is_deterministic(content in arb_content()) {
            prop_assert_eq!(encode(&content).unwrap(), encode(&content).unwrap());
        }

        /// The leading size field always accounts for the rest of the body.
        #[test]
        fn prop_size_field_matches_body(content in arb_content()) {
            let bytes = encode(&content).unwrap();
            let size = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
            prop_assert_eq!(size, bytes.len() - 4);
        }
    }
}
