//! # Reservation Time Windows
//!
//! A reservation occupies the half-open interval `[start, end)`.
//!
//! ```text
//!   A: 19:00 ────────── 20:30
//!   B:                  20:30 ────────── 22:00     A and B do NOT overlap
//!   C:        19:45 ────────── 21:15               A and C overlap
//! ```
//!
//! Two windows overlap when `a.start < b.end && b.start < a.end`. The same
//! predicate is used in SQL against the stored epoch-second columns.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::validate_duration_minutes;

/// Half-open time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds a window, rejecting an empty or inverted interval.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidFormat {
                field: "reservation_time".to_string(),
                reason: "window end must be after its start".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Window of `duration_minutes` starting at `start`.
    pub fn from_start(start: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(duration_minutes),
        }
    }

    /// Validated variant of [`from_start`](Self::from_start).
    pub fn try_from_start(
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<Self, ValidationError> {
        validate_duration_minutes(duration_minutes)?;
        Ok(Self::from_start(start, duration_minutes))
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Start as unix seconds (storage format).
    #[inline]
    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    /// End as unix seconds (storage format).
    #[inline]
    pub fn end_ts(&self) -> i64 {
        self.end.timestamp()
    }
}
