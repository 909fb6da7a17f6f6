//! # Validation Module
//!
//! Input validation for everything staff clients send in.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: HTTP extractor (serde)                                        │
//! │  └── Types and enum values (status, payment method)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Field rules: lengths, ranges, non-empty order                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── UNIQUE / FOREIGN KEY / CHECK constraints                           │
//! │  └── reservation overlap trigger                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check here runs before the first write of an operation, so a
//! rejected request leaves no trace in the store.

use crate::error::ValidationError;
use crate::types::{NewOrder, NewReservation, NewTable};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES, MAX_RESERVATION_MINUTES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a customer name on a reservation.
///
/// ```rust
/// use dinein_core::validation::validate_customer_name;
///
/// assert!(validate_customer_name("Ada Lovelace").is_ok());
/// assert!(validate_customer_name("   ").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_text("customer_name", name, 100)
}

/// Validates a contact phone number.
///
/// ## Rules
/// - Required, at most 20 characters
/// - Digits plus `+ - ( )` and spaces
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_text("customer_phone", phone, 20)?;

    if !phone
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
    {
        return Err(ValidationError::InvalidFormat {
            field: "customer_phone".to_string(),
            reason: "must contain only digits, spaces and + - ( )".to_string(),
        });
    }

    Ok(())
}

/// Validates a menu item or category name.
pub fn validate_menu_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates a free-text kitchen note on an order line (optional).
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(n) if n.chars().count() > 500 => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: 500,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (99)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a catalog price in cents. Zero is allowed (complimentary items).
///
/// ```rust
/// use dinein_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price_cents".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

pub fn validate_party_size(party_size: i64) -> ValidationResult<()> {
    if party_size <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "party_size".to_string(),
        });
    }
    Ok(())
}

pub fn validate_duration_minutes(minutes: i64) -> ValidationResult<()> {
    if !(1..=MAX_RESERVATION_MINUTES).contains(&minutes) {
        return Err(ValidationError::OutOfRange {
            field: "duration_minutes".to_string(),
            min: 1,
            max: MAX_RESERVATION_MINUTES,
        });
    }
    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

pub fn validate_new_table(table: &NewTable) -> ValidationResult<()> {
    if table.table_number <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "table_number".to_string(),
        });
    }
    if table.capacity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "capacity".to_string(),
        });
    }
    validate_text("location", &table.location, 50)
}

pub fn validate_new_reservation(booking: &NewReservation) -> ValidationResult<()> {
    validate_customer_name(&booking.customer_name)?;
    validate_phone(&booking.customer_phone)?;
    validate_party_size(booking.party_size)?;
    validate_duration_minutes(booking.duration_minutes())
}

/// Validates the shape of a new order.
///
/// ## Rules
/// - At least one line, at most MAX_ORDER_LINES (50)
/// - Every line has a valid quantity and note
///
/// Referenced ids (table, menu items) are checked by the store inside the
/// creating transaction.
pub fn validate_new_order(order: &NewOrder) -> ValidationResult<()> {
    if order.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if order.items.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for line in &order.items {
        validate_quantity(line.quantity)?;
        validate_notes(line.notes.as_deref())?;
    }

    Ok(())
}
