//! # Order Lifecycle Policies
//!
//! Decides which status changes and payments are acceptable. The database
//! layer consults these before it writes anything.
//!
//! ## Transition Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Permissive (default)                                                   │
//! │    any status ──► any status                                            │
//! │                                                                         │
//! │  ForwardOnly                                                            │
//! │    pending ─► preparing ─► ready ─► served ─► paid   (skips allowed)    │
//! │       └──────────┴──────────┴────────┴──────► cancelled                 │
//! │    paid, cancelled ─► nothing                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Permissive matches how staff actually use the kitchen board: a mis-tap
//! on "ready" is corrected by setting the order back to "preparing".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::OrderStatus;

// =============================================================================
// Transition Policy
// =============================================================================

/// Rule set applied to every order status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may be set from any status.
    #[default]
    Permissive,
    /// Only forward moves along the chain, plus cancellation.
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn can_transition(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::ForwardOnly => {
                if from.is_terminal() {
                    return false;
                }
                match (from.rank(), to.rank()) {
                    (_, None) => true,
                    (Some(current), Some(next)) => next > current,
                    (None, Some(_)) => false,
                }
            }
        }
    }

    /// Like [`can_transition`](Self::can_transition) but returns the error to
    /// surface to the caller.
    pub fn check(&self, order_id: i64, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
        if self.can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { order_id, from, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Permissive => "permissive",
            TransitionPolicy::ForwardOnly => "forward_only",
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "forward_only" => Ok(TransitionPolicy::ForwardOnly),
            _ => Err(ValidationError::NotAllowed {
                field: "transition_policy".to_string(),
                allowed: vec!["permissive".into(), "forward_only".into()],
            }),
        }
    }
}

// =============================================================================
// Payment Policy
// =============================================================================

/// Amount rules applied by the payment recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentPolicy {
    /// Require the payment amount to equal the order total exactly.
    #[serde(default)]
    pub strict_amount: bool,
}

impl PaymentPolicy {
    pub fn strict() -> Self {
        Self { strict_amount: true }
    }

    /// Validates `amount` against the order total.
    ///
    /// The amount must always be positive; equality with the total is only
    /// enforced in strict mode.
    pub fn check_amount(&self, amount: Money, order_total: Money) -> CoreResult<()> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "amount must be positive".to_string(),
            });
        }
        if self.strict_amount && amount != order_total {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!("amount {} does not match order total {}", amount, order_total),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_permissive_allows_everything() {
        let policy = TransitionPolicy::Permissive;
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(policy.can_transition(from, to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_forward_only_happy_path() {
        let policy = TransitionPolicy::ForwardOnly;
        assert!(policy.can_transition(Pending, Preparing));
        assert!(policy.can_transition(Preparing, Ready));
        assert!(policy.can_transition(Ready, Served));
        assert!(policy.can_transition(Served, Paid));
        // Skipping ahead is fine
        assert!(policy.can_transition(Pending, Served));
    }

    #[test]
    fn test_forward_only_rejects_backwards_and_terminal() {
        let policy = TransitionPolicy::ForwardOnly;
        assert!(!policy.can_transition(Served, Pending));
        assert!(!policy.can_transition(Ready, Ready));
        assert!(!policy.can_transition(Paid, Cancelled));
        assert!(!policy.can_transition(Cancelled, Pending));
    }

    #[test]
    fn test_forward_only_cancel_from_any_open_status() {
        let policy = TransitionPolicy::ForwardOnly;
        for from in [Pending, Preparing, Ready, Served] {
            assert!(policy.can_transition(from, Cancelled));
        }
        assert!(!policy.can_transition(Cancelled, Cancelled));
        assert!(!policy.can_transition(Served, Ready));
    }

    #[test]
    fn test_check_returns_invalid_transition() {
        let err = TransitionPolicy::ForwardOnly
            .check(4, Paid, Pending)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition { order_id: 4, from: Paid, to: Pending }
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("forward-only".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::ForwardOnly);
        assert_eq!("Permissive".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Permissive);
        assert!("strict".parse::<TransitionPolicy>().is_err());
    }

    #[test]
    fn test_payment_amount_rules() {
        let total = Money::from_cents(2500);
        let lenient = PaymentPolicy::default();
        assert!(lenient.check_amount(Money::from_cents(2000), total).is_ok());
        assert!(lenient.check_amount(Money::zero(), total).is_err());
        assert!(lenient.check_amount(Money::from_cents(-100), total).is_err());

        let strict = PaymentPolicy::strict();
        assert!(strict.check_amount(total, total).is_ok());
        assert!(matches!(
            strict.check_amount(Money::from_cents(2000), total),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }
}
