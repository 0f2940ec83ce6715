//! Notification feed subscription.
//!
//! The feed is an external pub/sub collaborator; the only real contract is
//! the event schema in [`crate::event`]. This module carries the thin
//! subscriber side: a length-prefixed JSON wire format, a reconnecting TCP
//! client, and a file-backed source for offline replay. Both sources hand
//! out events through the same [`EventSource`] seam.

pub mod client;
pub mod file;
pub mod wire;

use async_trait::async_trait;
use thiserror::Error;

use crate::event::FeedEvent;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("frame of {size} bytes exceeds the {limit}-byte limit")]
    Oversized { size: usize, limit: usize },
    #[error("failed to encode frame")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode frame")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Anything that yields feed events in delivery order.
///
/// `Ok(None)` means the source is exhausted (stream closed, file ended).
/// Sources skip undecodable entries themselves; a returned error is a
/// transport failure, not a malformed event.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Result<Option<FeedEvent>, FeedError>;
}
