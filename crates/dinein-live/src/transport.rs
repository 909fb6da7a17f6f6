//! # Observer Transports
//!
//! The hub only knows about queues; a transport is whatever carries
//! events the last hop to a client.
//!
//! ```text
//!   Subscription ──► delivery task ──► NotificationTransport
//!                                         ├── WebSocketTransport (staff clients)
//!                                         └── ChannelTransport   (in-process)
//! ```

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::LiveError;
use crate::hub::{spawn_delivery, DeliveryOptions, NotificationHub};
use crate::protocol::LiveEvent;

/// Last-hop carrier for one observer.
#[async_trait]
pub trait NotificationTransport: Send + 'static {
    async fn send(&mut self, event: &LiveEvent) -> Result<(), LiveError>;

    /// Keepalive. Transports without one succeed trivially.
    async fn ping(&mut self) -> Result<(), LiveError> {
        Ok(())
    }

    async fn close(&mut self);
}

// =============================================================================
// WebSocket
// =============================================================================

/// Write half of a staff client's WebSocket.
pub struct WebSocketTransport<S = SplitSink<WebSocket, Message>> {
    sink: S,
}

impl<S> WebSocketTransport<S>
where
    S: Sink<Message, Error = axum::Error> + Unpin + Send + 'static,
{
    pub fn new(sink: S) -> Self {
        WebSocketTransport { sink }
    }
}

#[async_trait]
impl<S> NotificationTransport for WebSocketTransport<S>
where
    S: Sink<Message, Error = axum::Error> + Unpin + Send + 'static,
{
    async fn send(&mut self, event: &LiveEvent) -> Result<(), LiveError> {
        let json = serde_json::to_string(event)?;
        self.sink.send(Message::Text(json.into())).await?;
        Ok(())
    }

    async fn ping(&mut self) -> Result<(), LiveError> {
        self.sink.send(Message::Ping(Bytes::new())).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.send(Message::Close(None)).await {
            debug!(error = %e, "WebSocket close frame not sent");
        }
    }
}

/// Runs one upgraded WebSocket as a hub observer until either side ends it.
///
/// Incoming frames are read only to notice the client leaving; clients
/// have nothing to say on this channel.
pub async fn serve_socket(socket: WebSocket, hub: NotificationHub, options: DeliveryOptions) {
    let (sink, mut stream) = socket.split();
    let subscription = hub.subscribe();
    let id = subscription.id();

    info!(subscriber = %id, total = hub.subscriber_count(), "Staff client connected");

    let mut delivery = spawn_delivery(subscription, WebSocketTransport::new(sink), options);

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(subscriber = %id, error = %e, "WebSocket read error");
                    break;
                }
            },
            _ = &mut delivery => break,
        }
    }

    delivery.abort();
    hub.unsubscribe(id);

    info!(subscriber = %id, "Staff client disconnected");
}

// =============================================================================
// In-process
// =============================================================================

/// Forwards events into an unbounded channel, for in-process observers.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<LiveEvent>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LiveEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelTransport { tx }, rx)
    }
}

#[async_trait]
impl NotificationTransport for ChannelTransport {
    async fn send(&mut self, event: &LiveEvent) -> Result<(), LiveError> {
        self.tx.send(event.clone()).map_err(|_| LiveError::Closed)
    }

    async fn close(&mut self) {}
}
