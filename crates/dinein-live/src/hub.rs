//! # Notification Hub
//!
//! Fan-out of [`LiveEvent`]s to every connected observer.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Notification Hub                                   │
//! │                                                                         │
//! │  producer ──► broadcast(event)                                          │
//! │                   │  fan-out lock (one broadcast at a time)             │
//! │                   ▼                                                     │
//! │   ┌─────────────────────────────────────────────┐                       │
//! │   │ DashMap<SubscriberId, mpsc::Sender>         │                       │
//! │   └──────┬───────────────┬───────────────┬──────┘                       │
//! │          │ try_send      │ try_send      │ try_send (Full → removed)    │
//! │          ▼               ▼               ▼                              │
//! │     [queue A]       [queue B]       [queue C]   bounded per observer    │
//! │          │               │               │                              │
//! │     delivery task   delivery task   delivery task                       │
//! │          │               │               │  send timeout → removed      │
//! │          ▼               ▼               ▼                              │
//! │     kitchen WS      billing WS      kitchen WS                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - `broadcast` never awaits, so producers are never held up by observers.
//! - Broadcasts are serialized, so every observer sees events in the same
//!   order, which is the order of the producers' calls.
//! - An observer whose queue is full or closed is removed during the
//!   broadcast; removal happens after iteration, never while iterating.
//! - Dropping a [`Subscription`] unsubscribes it.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::HubConfig;
use crate::error::LiveError;
use crate::protocol::LiveEvent;
use crate::transport::NotificationTransport;

// =============================================================================
// Subscriber Identity
// =============================================================================

/// Opaque handle identifying one observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        SubscriberId(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type EventSender = mpsc::Sender<Arc<LiveEvent>>;

// =============================================================================
// Hub
// =============================================================================

struct HubInner {
    subscribers: DashMap<SubscriberId, EventSender>,
    buffer: usize,
    /// Held for the whole fan-out of one event.
    fanout: Mutex<()>,
}

impl HubInner {
    fn remove(&self, id: &SubscriberId) -> bool {
        self.subscribers.remove(id).is_some()
    }
}

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Observers the event was queued for.
    pub delivered: usize,
    /// Observers removed because their queue was full or closed.
    pub dropped: usize,
}

/// Shared, cloneable handle to the subscriber registry.
#[derive(Clone)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("subscribers", &self.inner.subscribers.len())
            .field("buffer", &self.inner.buffer)
            .finish()
    }
}

impl NotificationHub {
    pub fn new(config: &HubConfig) -> Self {
        Self::with_buffer(config.subscriber_buffer)
    }

    /// Hub whose observers each queue at most `buffer` events.
    pub fn with_buffer(buffer: usize) -> Self {
        NotificationHub {
            inner: Arc::new(HubInner {
                subscribers: DashMap::new(),
                buffer: buffer.max(1),
                fanout: Mutex::new(()),
            }),
        }
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriberId::new();
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        self.inner.subscribers.insert(id, tx);

        debug!(subscriber = %id, total = self.inner.subscribers.len(), "Observer subscribed");

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Removes an observer. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.inner.remove(&id);
        if removed {
            debug!(subscriber = %id, "Observer unsubscribed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.inner.subscribers.contains_key(&id)
    }

    /// Queues `event` for every observer without waiting on any of them.
    pub fn broadcast(&self, event: LiveEvent) -> BroadcastReport {
        let event = Arc::new(event);
        let mut report = BroadcastReport::default();
        let mut dead = Vec::new();

        let _guard = self
            .inner
            .fanout
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for entry in self.inner.subscribers.iter() {
            match entry.value().try_send(Arc::clone(&event)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = %entry.key(), "Observer queue full, dropping observer");
                    dead.push(*entry.key());
                }
                Err(TrySendError::Closed(_)) => dead.push(*entry.key()),
            }
        }

        for id in dead {
            if self.inner.remove(&id) {
                report.dropped += 1;
            }
        }

        debug!(
            kind = event.kind(),
            order_id = event.order_id(),
            delivered = report.delivered,
            dropped = report.dropped,
            "Event broadcast"
        );

        report
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Receiving end of one observer. Unsubscribes on drop.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Arc<LiveEvent>>,
    hub: Weak<HubInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event, or `None` once the observer was removed from the hub.
    pub async fn recv(&mut self) -> Option<Arc<LiveEvent>> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Arc<LiveEvent>> {
        self.rx.try_recv().ok()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.remove(&self.id);
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// Per-observer delivery settings.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryOptions {
    pub send_timeout: Duration,
    pub ping_interval: Option<Duration>,
}

impl From<&HubConfig> for DeliveryOptions {
    fn from(config: &HubConfig) -> Self {
        DeliveryOptions {
            send_timeout: config.send_timeout(),
            ping_interval: config.ping_interval(),
        }
    }
}

/// Pumps a subscription into a transport on its own task.
///
/// The task ends when the queue closes, or when a send or ping fails or
/// exceeds `send_timeout`. The subscription is dropped first, which
/// unsubscribes it, then the transport gets at most `send_timeout` to close.
pub fn spawn_delivery<T>(
    subscription: Subscription,
    transport: T,
    options: DeliveryOptions,
) -> JoinHandle<()>
where
    T: NotificationTransport,
{
    tokio::spawn(deliver(subscription, transport, options))
}

async fn deliver<T>(mut subscription: Subscription, mut transport: T, options: DeliveryOptions)
where
    T: NotificationTransport,
{
    let id = subscription.id();
    let timeout_ms = options.send_timeout.as_millis() as u64;

    let ping_period = options
        .ping_interval
        .filter(|period| !period.is_zero())
        .unwrap_or(Duration::from_secs(3600));
    let mut ping = interval(ping_period);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ping.tick().await;

    let outcome: Result<(), LiveError> = loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break Ok(()) };
                match timeout(options.send_timeout, transport.send(&event)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => break Err(err),
                    Err(_) => break Err(LiveError::Timeout(timeout_ms)),
                }
            }
            _ = ping.tick(), if options.ping_interval.is_some() => {
                match timeout(options.send_timeout, transport.ping()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => break Err(err),
                    Err(_) => break Err(LiveError::Timeout(timeout_ms)),
                }
            }
        }
    };

    // Unsubscribe before closing; a half-open peer may never ack the close
    drop(subscription);

    match outcome {
        Ok(()) => info!(subscriber = %id, "Observer queue closed, delivery finished"),
        Err(err) if err.is_disconnect() => {
            info!(subscriber = %id, error = %err, "Observer disconnected, dropped")
        }
        Err(err) => warn!(subscriber = %id, error = %err, "Delivery failed, dropping observer"),
    }

    if timeout(options.send_timeout, transport.close()).await.is_err() {
        debug!(subscriber = %id, timeout_ms, "Transport close timed out");
    }
}
