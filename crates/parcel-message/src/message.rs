//! The message handle and its content and envelope accessors.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use parcel_codec::{ContentCodec, DecodeError, Shape, LIST_CONTENT_TYPE, MAP_CONTENT_TYPE};
use parcel_core::{Address, Duration, List, Map, TypedValue};
use tracing::debug;

use crate::error::{MessageError, MessageResult};

/// Everything a message holds. Owned exclusively by the shared cell inside
/// [`Message`].
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MessageData {
    pub(crate) content: Vec<u8>,
    pub(crate) content_type: String,
    pub(crate) subject: String,
    pub(crate) message_id: String,
    pub(crate) user_id: String,
    pub(crate) correlation_id: String,
    pub(crate) ttl: Duration,
    pub(crate) priority: u8,
    pub(crate) durable: bool,
    pub(crate) redelivered: bool,
    pub(crate) reply_to: Option<Address>,
    pub(crate) properties: Map,
}

/// A message: content, typed properties and envelope fields.
///
/// Cloning a `Message` clones the handle, not the message. Both handles see
/// every later change. The handle is single-threaded (`!Send`); callers that
/// need to share a message across threads must copy it out with
/// [`Message::deep_copy`] or add their own synchronization around the data
/// they extract.
///
/// Content is stored as bytes. Structured content (a [`Map`] or [`List`])
/// is encoded when it is set, and the content type becomes `amqp/map` or
/// `amqp/list`; text and byte content leave the content type empty.
#[derive(Clone, Default)]
pub struct Message {
    inner: Rc<RefCell<MessageData>>,
}

impl Message {
    /// Creates a message whose content is the UTF-8 bytes of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::from_bytes(text.into().into_bytes())
    }

    /// Creates a message with opaque byte content.
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self::from_data(MessageData {
            content: content.into(),
            ..MessageData::default()
        })
    }

    /// Creates a message from `bytes[offset..offset + length]`.
    pub fn from_slice(bytes: &[u8], offset: usize, length: usize) -> MessageResult<Self> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| {
                MessageError::range(
                    "content slice",
                    format!(
                        "offset {offset} + length {length} exceeds buffer of {} bytes",
                        bytes.len()
                    ),
                )
            })?;
        Ok(Self::from_bytes(&bytes[offset..end]))
    }

    /// Creates a message with structured content. `value` must be a map or
    /// a list.
    pub fn from_content(value: impl Into<TypedValue>) -> MessageResult<Self> {
        Self::from_content_with(value, &ContentCodec::default())
    }

    /// Like [`Message::from_content`], encoding with `codec`.
    pub fn from_content_with(
        value: impl Into<TypedValue>,
        codec: &ContentCodec,
    ) -> MessageResult<Self> {
        let message = Self::default();
        message.set_content_object_with(value, codec)?;
        Ok(message)
    }

    /// Creates a message whose content is an encoded map.
    pub fn from_map(map: Map) -> MessageResult<Self> {
        Self::from_content(map)
    }

    /// Creates a message whose content is an encoded list.
    pub fn from_list(list: List) -> MessageResult<Self> {
        Self::from_content(list)
    }

    pub(crate) fn from_data(data: MessageData) -> Self {
        Self {
            inner: Rc::new(RefCell::new(data)),
        }
    }

    pub(crate) fn data(&self) -> Ref<'_, MessageData> {
        self.inner.borrow()
    }

    /// Returns true if both handles refer to the same message.
    pub fn ptr_eq(&self, other: &Message) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns a new, independent message with the same content and fields.
    pub fn deep_copy(&self) -> Message {
        Self::from_data(self.inner.borrow().clone())
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Length of the encoded content in bytes.
    pub fn content_size(&self) -> usize {
        self.inner.borrow().content.len()
    }

    /// Returns the content as text.
    ///
    /// Fails with [`MessageError::Decoding`] carrying
    /// [`DecodeError::InvalidUtf8`] when the content is not UTF-8, which
    /// includes most structured content.
    pub fn content(&self) -> MessageResult<String> {
        String::from_utf8(self.inner.borrow().content.clone()).map_err(|err| {
            MessageError::Decoding(DecodeError::InvalidUtf8 {
                context: "content",
                offset: err.utf8_error().valid_up_to(),
            })
        })
    }

    /// Returns a copy of the raw content bytes.
    pub fn content_bytes(&self) -> Vec<u8> {
        self.inner.borrow().content.clone()
    }

    /// Copies the content into the front of `buffer` and returns its length.
    pub fn read_content(&self, buffer: &mut [u8]) -> MessageResult<usize> {
        let data = self.inner.borrow();
        let needed = data.content.len();
        if buffer.len() < needed {
            return Err(MessageError::BufferTooSmall {
                needed,
                available: buffer.len(),
            });
        }
        buffer[..needed].copy_from_slice(&data.content);
        Ok(needed)
    }

    /// Decodes map content.
    pub fn content_map(&self) -> MessageResult<Map> {
        self.content_map_with(&ContentCodec::default())
    }

    /// Like [`Message::content_map`], decoding with `codec`.
    pub fn content_map_with(&self, codec: &ContentCodec) -> MessageResult<Map> {
        let data = self.inner.borrow();
        if Shape::from_content_type(&data.content_type) != Some(Shape::Map) {
            return Err(MessageError::type_mismatch(
                MAP_CONTENT_TYPE,
                data.content_type.clone(),
            ));
        }
        codec.decode_map(&data.content).map_err(|err| {
            debug!(%err, size = data.content.len(), "map content failed to decode");
            err.into()
        })
    }

    /// Decodes list content.
    pub fn content_list(&self) -> MessageResult<List> {
        self.content_list_with(&ContentCodec::default())
    }

    /// Like [`Message::content_list`], decoding with `codec`.
    pub fn content_list_with(&self, codec: &ContentCodec) -> MessageResult<List> {
        let data = self.inner.borrow();
        if Shape::from_content_type(&data.content_type) != Some(Shape::List) {
            return Err(MessageError::type_mismatch(
                LIST_CONTENT_TYPE,
                data.content_type.clone(),
            ));
        }
        codec.decode_list(&data.content).map_err(|err| {
            debug!(%err, size = data.content.len(), "list content failed to decode");
            err.into()
        })
    }

    /// Returns the content as a typed value.
    ///
    /// Structured content decodes to a map or list, UTF-8 content becomes a
    /// string, and anything else is returned as binary.
    pub fn content_object(&self) -> MessageResult<TypedValue> {
        let data = self.inner.borrow();
        if let Some(shape) = Shape::from_content_type(&data.content_type) {
            return Ok(ContentCodec::default().decode(&data.content, shape)?);
        }
        Ok(match std::str::from_utf8(&data.content) {
            Ok(text) => TypedValue::String(text.to_owned()),
            Err(_) => TypedValue::Binary(data.content.clone()),
        })
    }

    /// Replaces the content with UTF-8 text and clears the content type.
    pub fn set_content(&self, text: impl Into<String>) {
        self.set_content_bytes(text.into().into_bytes());
    }

    /// Replaces the content with opaque bytes and clears the content type.
    pub fn set_content_bytes(&self, content: impl Into<Vec<u8>>) {
        let mut data = self.inner.borrow_mut();
        data.content = content.into();
        data.content_type.clear();
    }

    /// Replaces the content with an encoded map.
    pub fn set_content_map(&self, map: Map) -> MessageResult<()> {
        self.set_content_object(map)
    }

    /// Replaces the content with an encoded list.
    pub fn set_content_list(&self, list: List) -> MessageResult<()> {
        self.set_content_object(list)
    }

    /// Replaces the content with an encoded map or list.
    ///
    /// On failure the message is left unchanged.
    pub fn set_content_object(&self, value: impl Into<TypedValue>) -> MessageResult<()> {
        self.set_content_object_with(value, &ContentCodec::default())
    }

    /// Like [`Message::set_content_object`], encoding with `codec`.
    pub fn set_content_object_with(
        &self,
        value: impl Into<TypedValue>,
        codec: &ContentCodec,
    ) -> MessageResult<()> {
        let value = value.into();
        let encoded = codec.encode(&value)?;
        let shape = Shape::of(&value).unwrap_or(Shape::Map);

        let mut data = self.inner.borrow_mut();
        data.content = encoded;
        data.content_type = shape.content_type().to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Envelope
    // ------------------------------------------------------------------

    pub fn content_type(&self) -> String {
        self.inner.borrow().content_type.clone()
    }

    pub fn set_content_type(&self, content_type: impl Into<String>) {
        self.inner.borrow_mut().content_type = content_type.into();
    }

    pub fn subject(&self) -> String {
        self.inner.borrow().subject.clone()
    }

    pub fn set_subject(&self, subject: impl Into<String>) {
        self.inner.borrow_mut().subject = subject.into();
    }

    /// Identifier normally assigned by the transport on receipt.
    pub fn message_id(&self) -> String {
        self.inner.borrow().message_id.clone()
    }

    pub fn set_message_id(&self, id: impl Into<String>) {
        self.inner.borrow_mut().message_id = id.into();
    }

    pub fn user_id(&self) -> String {
        self.inner.borrow().user_id.clone()
    }

    pub fn set_user_id(&self, id: impl Into<String>) {
        self.inner.borrow_mut().user_id = id.into();
    }

    pub fn correlation_id(&self) -> String {
        self.inner.borrow().correlation_id.clone()
    }

    pub fn set_correlation_id(&self, id: impl Into<String>) {
        self.inner.borrow_mut().correlation_id = id.into();
    }

    /// Time-to-live; [`Duration::IMMEDIATE`] means none was set.
    pub fn ttl(&self) -> Duration {
        self.inner.borrow().ttl
    }

    pub fn set_ttl(&self, ttl: impl Into<Duration>) {
        self.inner.borrow_mut().ttl = ttl.into();
    }

    pub fn priority(&self) -> u8 {
        self.inner.borrow().priority
    }

    /// Sets the priority. Values outside `0..=255` are rejected with
    /// [`MessageError::Range`] and leave the priority unchanged.
    pub fn set_priority<P>(&self, priority: P) -> MessageResult<()>
    where
        P: TryInto<u8> + Copy + fmt::Display,
    {
        let value = priority.try_into().map_err(|_| {
            MessageError::range("priority", format!("{priority} is not within 0..=255"))
        })?;
        self.inner.borrow_mut().priority = value;
        Ok(())
    }

    pub fn durable(&self) -> bool {
        self.inner.borrow().durable
    }

    pub fn set_durable(&self, durable: bool) {
        self.inner.borrow_mut().durable = durable;
    }

    /// Set by the transport when the message has been delivered before.
    pub fn redelivered(&self) -> bool {
        self.inner.borrow().redelivered
    }

    pub fn set_redelivered(&self, redelivered: bool) {
        self.inner.borrow_mut().redelivered = redelivered;
    }

    pub fn reply_to(&self) -> Option<Address> {
        self.inner.borrow().reply_to.clone()
    }

    pub fn set_reply_to(&self, address: Address) {
        self.inner.borrow_mut().reply_to = Some(address);
    }

    pub fn clear_reply_to(&self) {
        self.inner.borrow_mut().reply_to = None;
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Returns a copy of all properties.
    pub fn properties(&self) -> Map {
        self.inner.borrow().properties.clone()
    }

    /// Replaces all properties at once.
    pub fn set_properties(&self, properties: Map) {
        self.inner.borrow_mut().properties = properties;
    }

    pub fn property(&self, key: &str) -> Option<TypedValue> {
        self.inner.borrow().properties.get(key).cloned()
    }

    /// Sets one property, replacing any previous value under `key`.
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<TypedValue>) {
        self.inner
            .borrow_mut()
            .properties
            .insert(key.into(), value.into());
    }

    pub fn remove_property(&self, key: &str) -> Option<TypedValue> {
        self.inner.borrow_mut().properties.remove(key)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.borrow(), f)
    }
}

/// Messages are equal when their content and every field match.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.inner.borrow() == *other.inner.borrow()
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<Vec<u8>> for Message {
    fn from(content: Vec<u8>) -> Self {
        Self::from_bytes(content)
    }
}
