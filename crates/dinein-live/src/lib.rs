//! # dinein-live: Notification Hub for the Dine-in Engine
//!
//! Pushes order events to every connected staff client: the kitchen
//! display learns about new orders, the billing counter about status
//! changes and payments.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Live Notification Flow                            │
//! │                                                                         │
//! │  order service ──► NotificationHub::broadcast(LiveEvent)                │
//! │                          │   never awaits, never fails                  │
//! │                          ▼                                              │
//! │   ┌──────────────────────────────────────────────────────────────────┐ │
//! │   │  Subscription (bounded queue)  ×  one per observer                │ │
//! │   └──────────────────────────────┬───────────────────────────────────┘ │
//! │                                  ▼                                      │
//! │   ┌──────────────────────────────────────────────────────────────────┐ │
//! │   │  delivery task: send with timeout, keepalive ping                 │ │
//! │   └──────────────────────────────┬───────────────────────────────────┘ │
//! │                                  ▼                                      │
//! │   NotificationTransport ── WebSocketTransport ──► staff client          │
//! │                         └─ ChannelTransport   ──► in-process observer   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`hub`] - Subscriber registry, fan-out and per-observer delivery
//! - [`protocol`] - Event payloads and their JSON wire shape
//! - [`transport`] - WebSocket and in-process transports
//! - [`config`] - Queue size, send timeout, ping interval
//! - [`error`] - Delivery error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dinein_live::{LiveEvent, NotificationHub, HubConfig};
//!
//! let hub = NotificationHub::new(&HubConfig::default());
//! let mut kitchen = hub.subscribe();
//!
//! hub.broadcast(LiveEvent::new_order(&detail));
//! let event = kitchen.recv().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::HubConfig;
pub use error::{LiveError, LiveResult};
pub use hub::{
    spawn_delivery, BroadcastReport, DeliveryOptions, NotificationHub, SubscriberId, Subscription,
};
pub use protocol::{LiveEvent, NewOrderPayload, OrderLineSummary};
pub use transport::{serve_socket, ChannelTransport, NotificationTransport, WebSocketTransport};
