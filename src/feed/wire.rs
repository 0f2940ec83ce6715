//! Length-prefixed frame format for the feed link.
//!
//! Frames are a 4-byte big-endian length prefix followed by a JSON payload.
//! The length field describes only the payload size. Maximum payload size is
//! 256 KiB; status events are tiny and anything larger is a broken producer.

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use super::FeedError;

/// Maximum frame payload size: 256 KiB.
pub const MAX_FRAME_SIZE: usize = 262_144;

/// Frame codec for the feed link: u32 big-endian length prefix, payload-only
/// length field, 256 KiB cap. Payloads pass through as raw bytes; JSON
/// encoding/decoding is layered on top with [`encode_frame`]/[`decode_frame`].
pub struct FeedCodec {
    inner: LengthDelimitedCodec,
}

impl FeedCodec {
    pub fn new() -> Self {
        let inner = LengthDelimitedCodec::builder()
            .big_endian()
            .length_field_length(4)
            .max_frame_length(MAX_FRAME_SIZE)
            .length_adjustment(0)
            .new_codec();

        Self { inner }
    }
}

impl Default for FeedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FeedCodec {
    type Item = BytesMut;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, Self::Error> {
        self.inner.decode(src)
    }
}

impl Encoder<Bytes> for FeedCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.inner.encode(item, dst)
    }
}

/// Serialize a message into a frame payload (the codec adds the prefix).
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<Bytes, FeedError> {
    let json = serde_json::to_vec(msg).map_err(FeedError::Encode)?;
    if json.len() > MAX_FRAME_SIZE {
        return Err(FeedError::Oversized {
            size: json.len(),
            limit: MAX_FRAME_SIZE,
        });
    }
    Ok(Bytes::from(json))
}

/// Deserialize a message from a frame payload (prefix already stripped).
pub fn decode_frame<T: DeserializeOwned>(payload: &[u8]) -> Result<T, FeedError> {
    serde_json::from_slice(payload).map_err(FeedError::Decode)
}

/// Messages a subscriber sends to the feed.
///
/// Exactly one today: the subscription itself, sent once per connection
/// before any event flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe { channels: Vec<String> },
}
