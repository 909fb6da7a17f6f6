//! # Error Types
//!
//! Domain-specific error types for dinein-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError                                                              │
//! │  ├── *NotFound          table / menu item / order / reservation absent │
//! │  ├── InvalidTransition  status change rejected by the policy           │
//! │  ├── AlreadyPaid        second payment attempt                          │
//! │  ├── SlotConflict       overlapping reservation on the same table       │
//! │  ├── StaleStatus        order changed underneath a transition           │
//! │  └── Validation         wraps ValidationError (field-level input rules) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending id or value in the message
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the lifecycle engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Table not found: {0}")]
    TableNotFound(i64),

    /// Menu item is missing or has been deactivated.
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(i64),

    /// The configured transition policy rejects the status change.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The order is already settled.
    ///
    /// ## When This Occurs
    /// - A second `pay` call on the same order
    /// - Two concurrent payments, the loser of the race sees this
    #[error("Order {0} is already paid")]
    AlreadyPaid(i64),

    /// Another non-cancelled reservation overlaps the requested window.
    #[error("Table {table_id} is already reserved between {starts_at} and {ends_at}")]
    SlotConflict {
        table_id: i64,
        starts_at: String,
        ends_at: String,
    },

    #[error("Party of {party_size} exceeds table {table_id} capacity of {capacity}")]
    PartyTooLarge {
        table_id: i64,
        party_size: i64,
        capacity: i64,
    },

    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// The order status changed between read and write inside a transition.
    #[error("Order {order_id} is no longer {expected}")]
    StaleStatus { order_id: i64, expected: OrderStatus },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for the "referenced entity does not exist" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::TableNotFound(_)
                | CoreError::MenuItemNotFound(_)
                | CoreError::OrderNotFound(_)
                | CoreError::ReservationNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, detected before any write happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            order_id: 7,
            from: OrderStatus::Served,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "Order 7 cannot move from served to pending");

        let err = CoreError::AlreadyPaid(3);
        assert_eq!(err.to_string(), "Order 3 is already paid");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "customer_name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(!core_err.is_not_found());
    }

    #[test]
    fn test_not_found_family() {
        assert!(CoreError::TableNotFound(1).is_not_found());
        assert!(CoreError::MenuItemNotFound(1).is_not_found());
        assert!(!CoreError::AlreadyPaid(1).is_not_found());
    }
}
