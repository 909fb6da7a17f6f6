//! # Domain Types
//!
//! Core domain types used throughout the dine-in workspace.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌────────────────┐    ┌──────────────────┐         │
//! │  │   Table     │◄───│  Reservation   │    │  Category        │         │
//! │  │  number     │    │  window        │    │   └─ MenuItem    │         │
//! │  │  capacity   │    │  status        │    │      price_cents │         │
//! │  └─────▲───────┘    └───────▲────────┘    └────────┬─────────┘         │
//! │        │                    │ (optional)           │ snapshot          │
//! │  ┌─────┴────────────────────┴────────┐    ┌────────▼─────────┐         │
//! │  │              Order                │───►│   OrderItem      │         │
//! │  │  status (OrderStatus)             │    │  unit_price_cents│         │
//! │  │  total_cents                      │    │  name_snapshot   │         │
//! │  └─────┬────────────────────┬────────┘    └──────────────────┘         │
//! │        │                    │                                           │
//! │  ┌─────▼────────────┐  ┌────▼─────────┐                                │
//! │  │ OrderStatusLog   │  │   Payment    │                                │
//! │  │ old → new        │  │   method     │                                │
//! │  └──────────────────┘  └──────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An `OrderItem` copies the menu item's name and price at the moment the
//! order is created. Later catalog edits never touch existing orders.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::schedule::TimeWindow;
use crate::{DEFAULT_RESERVATION_MINUTES, DEFAULT_TABLE_LOCATION};

// =============================================================================
// Table
// =============================================================================

/// A physical seating unit. Tables are deactivated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Table {
    pub id: i64,
    /// Number painted on the table; unique across the restaurant.
    pub table_number: i64,
    pub capacity: i64,
    pub location: String,
    pub is_active: bool,
}

/// Input for creating a table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTable {
    pub table_number: i64,
    pub capacity: i64,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_location() -> String {
    DEFAULT_TABLE_LOCATION.to_string()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Menu Catalog
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub display_order: i64,
}

/// A catalog entry. Read-mostly; orders only ever read it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MenuItem {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current catalog price in cents.
    pub price_cents: i64,
    pub is_active: bool,
}

impl MenuItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Reservation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

/// A booked time window for a table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reservation {
    pub id: i64,
    pub table_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub party_size: i64,
    /// Start of the booked window.
    #[ts(as = "String")]
    pub reservation_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: ReservationStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// The `[start, start + duration)` window this reservation occupies.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_start(self.reservation_time, self.duration_minutes)
    }

    pub fn is_active(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

/// Input for booking a table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReservation {
    pub table_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub party_size: i64,
    #[ts(as = "String")]
    pub reservation_time: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
}

impl NewReservation {
    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes.unwrap_or(DEFAULT_RESERVATION_MINUTES)
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.reservation_time + Duration::minutes(self.duration_minutes())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a dine-in order.
///
/// ```text
/// pending ──► preparing ──► ready ──► served ──► paid
///    │            │           │          │
///    └────────────┴───────────┴──────────┴──────► cancelled
/// ```
///
/// Which arrows are actually legal is decided by
/// [`TransitionPolicy`](crate::lifecycle::TransitionPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// `paid` and `cancelled` end the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Statuses the kitchen display still has to act on.
    pub fn is_in_kitchen(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Preparing | OrderStatus::Ready
        )
    }

    /// Position along the main chain; `None` for `cancelled`.
    pub fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Preparing => Some(1),
            OrderStatus::Ready => Some(2),
            OrderStatus::Served => Some(3),
            OrderStatus::Paid => Some(4),
            OrderStatus::Cancelled => None,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|status| status.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A single dine-in transaction tied to a table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    pub reservation_id: Option<i64>,
    pub status: OrderStatus,
    /// Σ(unit_price × quantity) at creation time.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A priced line within an order. Owned exclusively by its order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    /// Menu item name at order time (frozen).
    pub name_snapshot: String,
    /// Unit price at order time (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total; the order total already proved this cannot overflow.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents * self.quantity)
    }
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One requested line of a new order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrderLine {
    pub menu_item_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for the order builder.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub table_id: i64,
    #[serde(default)]
    pub reservation_id: Option<i64>,
    pub items: Vec<NewOrderLine>,
}

/// Append-only audit record of one status change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderStatusLog {
    pub id: i64,
    pub order_id: i64,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    #[ts(as = "String")]
    pub changed_at: DateTime<Utc>,
}

/// Result of a successful status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusChange {
    pub order_id: i64,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "online" => Ok(PaymentMethod::Online),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: vec!["cash".into(), "card".into(), "online".into()],
            }),
        }
    }
}

/// A monetary settlement against an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    /// External reference (card terminal auth, online gateway id).
    pub transaction_id: Option<String>,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Input for the payment recorder.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPayment {
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_status_parsing() {
        assert_eq!("ready".parse::<OrderStatus>().unwrap(), OrderStatus::Ready);
        assert_eq!(" paid ".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert!("Ready".parse::<OrderStatus>().is_err());
        assert!("delivered".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde_matches_display() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_terminal_and_kitchen_statuses() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Served.is_terminal());
        assert!(OrderStatus::Ready.is_in_kitchen());
        assert!(!OrderStatus::Served.is_in_kitchen());
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("CASH".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("online".parse::<PaymentMethod>().unwrap(), PaymentMethod::Online);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_new_reservation_defaults_to_ninety_minutes() {
        let start = Utc.with_ymd_and_hms(2026, 10, 14, 19, 0, 0).unwrap();
        let json = serde_json::json!({
            "table_id": 3,
            "customer_name": "Ada",
            "customer_phone": "555-0100",
            "party_size": 2,
            "reservation_time": start,
        });
        let booking: NewReservation = serde_json::from_value(json).unwrap();
        assert_eq!(booking.duration_minutes(), 90);
        assert_eq!(booking.ends_at(), start + Duration::minutes(90));
    }

    #[test]
    fn test_new_table_defaults() {
        let table: NewTable =
            serde_json::from_value(serde_json::json!({ "table_number": 9, "capacity": 4 }))
                .unwrap();
        assert_eq!(table.location, "main_hall");
        assert!(table.is_active);
    }

    #[test]
    fn test_order_detail_flattens_order_fields() {
        let now = Utc::now();
        let detail = OrderDetail {
            order: Order {
                id: 1,
                table_id: 3,
                reservation_id: None,
                status: OrderStatus::Pending,
                total_cents: 2500,
                created_at: now,
                updated_at: now,
            },
            items: vec![],
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["status"], "pending");
        assert!(value["items"].as_array().unwrap().is_empty());
    }
}
