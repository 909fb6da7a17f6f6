//! # dinein-server: HTTP/WebSocket API for the Dine-in Engine
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dine-in Server                                   │
//! │                                                                         │
//! │  floor staff app ──► POST /api/orders ─┐                                │
//! │                                        ▼                                │
//! │                              ┌───────────────────┐   commit             │
//! │                              │  OrderService     │──────────► SQLite    │
//! │                              │  (services/)      │                      │
//! │                              └─────────┬─────────┘                      │
//! │                                        │ broadcast                      │
//! │                                        ▼                                │
//! │                              ┌───────────────────┐                      │
//! │  kitchen display ◄── /ws ────│ NotificationHub   │                      │
//! │  billing counter ◄── /ws ────│                   │                      │
//! │                              └───────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - TOML + environment configuration
//! - [`error`] - `ApiError` and HTTP status mapping
//! - [`routes`] - axum handlers and router assembly
//! - [`services`] - write operations followed by live notification
//! - [`state`] - shared handler state

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;
