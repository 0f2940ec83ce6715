//! Reconnecting TCP subscriber for the notification feed.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use super::wire::{decode_frame, encode_frame, ClientMessage, FeedCodec};
use super::{EventSource, FeedError};
use crate::event::FeedEvent;

/// Initial reconnect delay.
const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
/// Reconnect delay cap.
const BACKOFF_MAX: Duration = Duration::from_secs(30);
/// Random jitter added to every reconnect delay (milliseconds).
const BACKOFF_JITTER_MS: u64 = 250;

/// A live subscription to the notification feed.
pub struct FeedClient {
    framed: Framed<TcpStream, FeedCodec>,
}

impl FeedClient {
    /// Connect to the feed at `addr` and subscribe to `channels`.
    pub async fn connect(addr: &str, channels: &[String]) -> Result<Self, FeedError> {
        info!(address = %addr, "connecting to feed");
        let stream = TcpStream::connect(addr).await?;
        let mut framed = Framed::new(stream, FeedCodec::new());

        let subscribe = ClientMessage::Subscribe {
            channels: channels.to_vec(),
        };
        framed.send(encode_frame(&subscribe)?).await?;
        info!(channels = ?channels, "subscribed");

        Ok(Self { framed })
    }
}

#[async_trait]
impl EventSource for FeedClient {
    async fn next_event(&mut self) -> Result<Option<FeedEvent>, FeedError> {
        loop {
            let frame = match self.framed.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            };

            match decode_frame::<FeedEvent>(&frame) {
                Ok(event) => return Ok(Some(event)),
                // A malformed frame (unknown channel, status outside the
                // vocabulary, junk payload) is skipped, never fatal.
                Err(e) => warn!(error = %e, "skipping undecodable feed frame"),
            }
        }
    }
}

/// Daemon feed task: keep a subscription alive and forward every event to
/// the projection channel. Events missed while disconnected are lost; the
/// board is a live projection, not a log.
pub async fn run_feed_loop(addr: String, channels: Vec<String>, events: mpsc::Sender<FeedEvent>) {
    let mut backoff = BACKOFF_INITIAL;

    loop {
        match FeedClient::connect(&addr, &channels).await {
            Ok(mut client) => {
                backoff = BACKOFF_INITIAL;
                loop {
                    match client.next_event().await {
                        Ok(Some(event)) => {
                            debug!(?event, "feed event");
                            if events.send(event).await.is_err() {
                                info!("projection channel closed, feed loop exiting");
                                return;
                            }
                        }
                        Ok(None) => {
                            warn!("feed closed the connection");
                            break;
                        }
                        Err(e) => {
                            warn!(error = %e, "feed stream error");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(address = %addr, error = %e, "feed connection failed");
            }
        }

        let jitter = rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS);
        let delay = backoff + Duration::from_millis(jitter);
        debug!(delay_ms = delay.as_millis() as u64, "reconnecting to feed");
        tokio::time::sleep(delay).await;
        backoff = (backoff * 2).min(BACKOFF_MAX);
    }
}
