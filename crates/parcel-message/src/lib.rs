//! Message value type for parcel.
//!
//! A [`Message`] carries content (raw bytes, text, or a structured map or
//! list of typed values), a map of typed properties, and envelope metadata
//! such as subject, ids, time-to-live, priority and a reply-to address.
//!
//! `Message` is a shared handle: cloning it yields another handle to the
//! same message, and changes through one are visible through all. Use
//! [`Message::deep_copy`] for an independent message.
//!
//! # Example
//!
//! ```rust
//! use parcel_core::{Address, Duration, Map, TypedValue};
//! use parcel_message::Message;
//!
//! let mut content = Map::new();
//! content.insert("name".to_string(), TypedValue::from("Widget"));
//!
//! let message = Message::from_map(content).unwrap();
//! message.set_subject("inventory");
//! message.set_ttl(Duration::SECOND);
//! message.set_reply_to(Address::new("replies").with_subject("inventory"));
//!
//! let received = message.clone();
//! assert_eq!(received.content_map().unwrap()["name"].as_str(), Ok("Widget"));
//! assert_eq!(received.content_type(), "amqp/map");
//! ```
//!
//! [`encode_message`] and [`decode_message`] turn a whole message into a
//! length-prefixed frame and back, for collaborators that need to move
//! messages as bytes.

mod error;
mod framing;
mod message;


pub use error::{MessageError, MessageResult};
pub use framing::{
    decode_message, decode_message_with, encode_message, encode_message_with, FrameReader,
    FrameWriter,
};
pub use message::Message;
