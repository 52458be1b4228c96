//! Length-prefixed framing of whole messages.
//!
//! A frame is a 4-byte big-endian length prefix followed by an encoded
//! header map:
//!
//! ```text
//! +----------------+----------------------+
//! | length (4 BE)  |  header map          |
//! +----------------+----------------------+
//! ```
//!
//! The header map uses the content encoding and carries the envelope fields
//! under their own names (`subject`, `message_id`, `ttl`, ...), the
//! properties under `properties` and the raw content under `content`.
//! Fields holding their default value are left out. Unknown keys are
//! ignored on decode.

use std::io::{Read, Write};

use parcel_codec::ContentCodec;
use parcel_core::{Address, Duration, Map, TypedValue};
use tracing::{debug, trace};

use crate::error::{MessageError, MessageResult};
use crate::message::{Message, MessageData};

const SUBJECT: &str = "subject";
const CONTENT_TYPE: &str = "content_type";
const MESSAGE_ID: &str = "message_id";
const USER_ID: &str = "user_id";
const CORRELATION_ID: &str = "correlation_id";
const TTL: &str = "ttl";
const PRIORITY: &str = "priority";
const DURABLE: &str = "durable";
const REDELIVERED: &str = "redelivered";
const REPLY_TO: &str = "reply_to";
const PROPERTIES: &str = "properties";
const CONTENT: &str = "content";

/// Encodes a message into a length-prefixed frame.
///
/// # Example
///
/// ```rust
/// use parcel_message::{decode_message, encode_message, Message};
///
/// let message = Message::new("hello");
/// message.set_subject("greetings");
///
/// let bytes = encode_message(&message).unwrap();
/// let decoded = decode_message(&bytes).unwrap();
/// assert_eq!(decoded.subject(), "greetings");
/// assert_eq!(decoded.content().unwrap(), "hello");
/// ```
pub fn encode_message(message: &Message) -> MessageResult<Vec<u8>> {
    encode_message_with(message, &ContentCodec::default())
}

/// Like [`encode_message`], enforcing the limits of `codec`.
pub fn encode_message_with(message: &Message, codec: &ContentCodec) -> MessageResult<Vec<u8>> {
    let header = to_header(&message.data());
    let body = frame_codec(codec).encode_map(&header)?;

    let max = codec.limits().max_frame_size;
    let len = u32::try_from(body.len())
        .ok()
        .filter(|len| *len as usize <= max)
        .ok_or(MessageError::MessageTooLarge {
            size: body.len(),
            max,
        })?;

    let mut buffer = Vec::with_capacity(4 + body.len());
    buffer.extend_from_slice(&len.to_be_bytes());
    buffer.extend_from_slice(&body);
    Ok(buffer)
}

/// Decodes a message from a complete frame (length prefix + header map).
///
/// Bytes after the frame are ignored.
pub fn decode_message(data: &[u8]) -> MessageResult<Message> {
    decode_message_with(data, &ContentCodec::default())
}

/// Like [`decode_message`], enforcing the limits of `codec`.
pub fn decode_message_with(data: &[u8], codec: &ContentCodec) -> MessageResult<Message> {
    let Some(len_bytes) = data.first_chunk::<4>() else {
        return Err(MessageError::IncompleteMessage {
            expected: 4,
            received: data.len(),
        });
    };
    let len = check_frame_len(u32::from_be_bytes(*len_bytes), codec)?;

    let Some(body) = data.get(4..4 + len) else {
        return Err(MessageError::IncompleteMessage {
            expected: 4 + len,
            received: data.len(),
        });
    };
    decode_body(body, codec)
}

fn check_frame_len(len: u32, codec: &ContentCodec) -> MessageResult<usize> {
    let len = len as usize;
    let max = codec.limits().max_frame_size;
    if len > max {
        return Err(MessageError::MessageTooLarge { size: len, max });
    }
    if len == 0 {
        return Err(MessageError::EmptyMessage);
    }
    Ok(len)
}

fn decode_body(body: &[u8], codec: &ContentCodec) -> MessageResult<Message> {
    let header = frame_codec(codec).decode_map(body)?;
    Ok(Message::from_data(from_header(header)?))
}

/// The header map sits one level above the message's own content. Its size
/// is checked against the frame limit by the callers.
fn frame_codec(codec: &ContentCodec) -> ContentCodec {
    let limits = codec.limits();
    ContentCodec::new(
        limits
            .clone()
            .with_max_depth(limits.max_depth.saturating_add(1))
            .with_max_content_size(usize::MAX),
    )
}

fn to_header(data: &MessageData) -> Map {
    let mut header = Map::new();

    for (key, value) in [
        (SUBJECT, &data.subject),
        (CONTENT_TYPE, &data.content_type),
        (MESSAGE_ID, &data.message_id),
        (USER_ID, &data.user_id),
        (CORRELATION_ID, &data.correlation_id),
    ] {
        if !value.is_empty() {
            header.insert(key.to_string(), TypedValue::String(value.clone()));
        }
    }

    if data.ttl != Duration::IMMEDIATE {
        header.insert(TTL.to_string(), TypedValue::UInt64(data.ttl.as_millis()));
    }
    if data.priority != 0 {
        header.insert(PRIORITY.to_string(), TypedValue::UInt8(data.priority));
    }
    if data.durable {
        header.insert(DURABLE.to_string(), TypedValue::Bool(true));
    }
    if data.redelivered {
        header.insert(REDELIVERED.to_string(), TypedValue::Bool(true));
    }
    if let Some(address) = &data.reply_to {
        let mut reply_to = Map::new();
        reply_to.insert("name".to_string(), address.name.clone().into());
        if let Some(subject) = &address.subject {
            reply_to.insert("subject".to_string(), subject.clone().into());
        }
        header.insert(REPLY_TO.to_string(), TypedValue::Map(reply_to));
    }
    if !data.properties.is_empty() {
        header.insert(
            PROPERTIES.to_string(),
            TypedValue::Map(data.properties.clone()),
        );
    }
    header.insert(CONTENT.to_string(), TypedValue::Binary(data.content.clone()));

    header
}

fn from_header(mut header: Map) -> MessageResult<MessageData> {
    let data = MessageData {
        subject: take(&mut header, SUBJECT, "string", string)?.unwrap_or_default(),
        content_type: take(&mut header, CONTENT_TYPE, "string", string)?.unwrap_or_default(),
        message_id: take(&mut header, MESSAGE_ID, "string", string)?.unwrap_or_default(),
        user_id: take(&mut header, USER_ID, "string", string)?.unwrap_or_default(),
        correlation_id: take(&mut header, CORRELATION_ID, "string", string)?
            .unwrap_or_default(),
        ttl: take(&mut header, TTL, "uint64", |value| match value {
            TypedValue::UInt64(ms) => Some(Duration::from_millis(ms)),
            _ => None,
        })?
        .unwrap_or_default(),
        priority: take(&mut header, PRIORITY, "uint8", |value| match value {
            TypedValue::UInt8(priority) => Some(priority),
            _ => None,
        })?
        .unwrap_or_default(),
        durable: take(&mut header, DURABLE, "bool", boolean)?.unwrap_or_default(),
        redelivered: take(&mut header, REDELIVERED, "bool", boolean)?.unwrap_or_default(),
        reply_to: take(&mut header, REPLY_TO, "address map", address)?,
        properties: take(&mut header, PROPERTIES, "map", |value| value.into_map().ok())?
            .unwrap_or_default(),
        content: take(&mut header, CONTENT, "binary", |value| match value {
            TypedValue::Binary(bytes) => Some(bytes),
            _ => None,
        })?
        .unwrap_or_default(),
    };

    for key in header.keys() {
        trace!(key = %key, "ignoring unknown header field");
    }

    Ok(data)
}

/// Removes `field` from the header and converts it with `extract`.
fn take<T>(
    header: &mut Map,
    field: &'static str,
    expected: &'static str,
    extract: impl FnOnce(TypedValue) -> Option<T>,
) -> MessageResult<Option<T>> {
    let Some(value) = header.remove(field) else {
        return Ok(None);
    };
    let found = value.type_name();
    extract(value)
        .map(Some)
        .ok_or(MessageError::InvalidHeader {
            field,
            expected,
            found,
        })
}

fn string(value: TypedValue) -> Option<String> {
    match value {
        TypedValue::String(s) => Some(s),
        _ => None,
    }
}

fn boolean(value: TypedValue) -> Option<bool> {
    match value {
        TypedValue::Bool(b) => Some(b),
        _ => None,
    }
}

fn address(value: TypedValue) -> Option<Address> {
    let mut map = value.into_map().ok()?;
    let name = string(map.remove("name")?)?;
    let subject = match map.remove("subject") {
        None => None,
        Some(subject) => Some(string(subject)?),
    };
    Some(Address { name, subject })
}

/// Reads framed messages from a byte stream.
pub struct FrameReader<R> {
    reader: R,
    codec: ContentCodec,
}

impl<R: Read> FrameReader<R> {
    /// Creates a new FrameReader with default limits.
    pub fn new(reader: R) -> Self {
        Self::with_codec(reader, ContentCodec::default())
    }

    /// Creates a new FrameReader enforcing the limits of `codec`.
    pub fn with_codec(reader: R, codec: ContentCodec) -> Self {
        Self { reader, codec }
    }

    /// Reads a single framed message.
    ///
    /// Returns `Ok(None)` if the stream ends before the first byte of a
    /// length prefix. Returns an error if the frame is incomplete or
    /// malformed, including a stream that ends inside the prefix.
    pub fn read_message(&mut self) -> MessageResult<Option<Message>> {
        let Some(len_buf) = self.read_prefix()? else {
            return Ok(None);
        };

        let len = check_frame_len(u32::from_be_bytes(len_buf), &self.codec)?;

        let mut body = vec![0u8; len];
        self.reader.read_exact(&mut body)?;
        debug!(len, "read message frame");

        decode_body(&body, &self.codec).map(Some)
    }

    fn read_prefix(&mut self) -> MessageResult<Option<[u8; 4]>> {
        let mut len_buf = [0u8; 4];
        let mut filled = 0;
        while filled < len_buf.len() {
            match self.reader.read(&mut len_buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(MessageError::IncompleteMessage {
                        expected: len_buf.len(),
                        received: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(len_buf))
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwraps this FrameReader, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes framed messages to a byte stream.
pub struct FrameWriter<W> {
    writer: W,
    codec: ContentCodec,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a new FrameWriter with default limits.
    pub fn new(writer: W) -> Self {
        Self::with_codec(writer, ContentCodec::default())
    }

    /// Creates a new FrameWriter enforcing the limits of `codec`.
    pub fn with_codec(writer: W, codec: ContentCodec) -> Self {
        Self { writer, codec }
    }

    /// Writes a single framed message.
    pub fn write_message(&mut self, message: &Message) -> MessageResult<()> {
        let data = encode_message_with(message, &self.codec)?;
        self.writer.write_all(&data)?;
        debug!(len = data.len() - 4, "wrote message frame");
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> MessageResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Unwraps this FrameWriter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
