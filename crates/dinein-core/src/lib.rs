//! # dinein-core: Pure Domain Logic for Dine-in Orders
//!
//! Everything here is deterministic and free of I/O: the types the rest of
//! the workspace passes around, integer money, the order status transition
//! policy, reservation time windows and input validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dine-in Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Staff clients (kitchen, billing)                │   │
//! │  └──────────────┬──────────────────────────────▲───────────────────┘   │
//! │                 │ HTTP                          │ WebSocket events      │
//! │  ┌──────────────▼───────────────────┐  ┌───────┴──────────────────┐   │
//! │  │          apps/server             │──►       dinein-live        │   │
//! │  └──────────────┬───────────────────┘  └──────────────────────────┘   │
//! │                 │                                                       │
//! │  ┌──────────────▼───────────────────┐                                  │
//! │  │            dinein-db             │                                  │
//! │  └──────────────┬───────────────────┘                                  │
//! │                 │                                                       │
//! │  ┌──────────────▼──────────────────────────────────────────────────┐   │
//! │  │               ★ dinein-core (THIS CRATE) ★                      │   │
//! │  │   types · money · lifecycle · schedule · validation · error     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Table, Reservation, Order, Payment, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`lifecycle`] - Order status transition and payment policies
//! - [`schedule`] - Half-open reservation time windows
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example
//!
//! ```rust
//! use dinein_core::{Money, OrderStatus, TransitionPolicy};
//!
//! let burger = Money::from_cents(1000);
//! let fries = Money::from_cents(500);
//! let total = burger.checked_line_total(2).unwrap() + fries;
//! assert_eq!(total.to_string(), "$25.00");
//!
//! let policy = TransitionPolicy::ForwardOnly;
//! assert!(policy.can_transition(OrderStatus::Pending, OrderStatus::Ready));
//! assert!(!policy.can_transition(OrderStatus::Served, OrderStatus::Pending));
//! ```

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod schedule;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{PaymentPolicy, TransitionPolicy};
pub use money::Money;
pub use schedule::TimeWindow;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// Catches fat-finger entries such as 100 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Maximum number of line items in a single order.
pub const MAX_ORDER_LINES: usize = 50;

/// Reservation length used when the booking does not specify one.
pub const DEFAULT_RESERVATION_MINUTES: i64 = 90;

/// Longest reservation window accepted.
pub const MAX_RESERVATION_MINUTES: i64 = 24 * 60;

/// Location label given to tables created without one.
pub const DEFAULT_TABLE_LOCATION: &str = "main_hall";
