//! # dinein-db: Store Gateway for the Dine-in Engine
//!
//! Durable storage for tables, reservations, the menu catalog, orders,
//! status logs and payments. Every multi-statement operation runs inside a
//! single sqlx transaction; if any step fails the transaction is dropped
//! and rolled back, so no partial order or payment is ever visible.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dine-in Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /api/orders)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     dinein-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ TableRepository    │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ ReservationRepo    │  │ 001_init   │  │   │
//! │  │   │ WAL, FKs      │    │ MenuRepository     │  │  + overlap │  │   │
//! │  │   │ busy_timeout  │    │ OrderRepository    │  │    trigger │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dinein_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./dinein.db")).await?;
//! let detail = db.orders().create_order(&new_order).await?;
//! db.orders()
//!     .set_status(detail.order.id, OrderStatus::Preparing, TransitionPolicy::default())
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::menu::MenuRepository;
pub use repository::order::{OrderRepository, PaymentReceipt};
pub use repository::reservation::ReservationRepository;
pub use repository::table::TableRepository;
