//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Dine-in Server                     │
//! │                                                                         │
//! │  Handler ── Result<Json<T>, ApiError>                                   │
//! │     │                                                                   │
//! │     ├── CoreError (business rule) ──┐                                   │
//! │     ├── DbError   (store)  ─────────┼──► ApiError { code, message }     │
//! │     └── Json/Query/Path rejection ──┘           │                       │
//! │                                                 ▼                       │
//! │                                     HTTP status + JSON body             │
//! │                                                                         │
//! │  NOT_FOUND 404 · INVALID_ARGUMENT 400 · CONFLICT 409                    │
//! │  ALREADY_PAID 409 · UNAVAILABLE 503 (retryable) · INTERNAL 500          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store internals are logged here and replaced by a generic message; they
//! never reach the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use dinein_core::{CoreError, ValidationError};
use dinein_db::DbError;

/// Error body returned to clients.
///
/// ```json
/// { "code": "ALREADY_PAID", "message": "Order 12 is already paid" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity does not exist (404)
    NotFound,

    /// Input or requested transition rejected (400)
    InvalidArgument,

    /// State conflict such as a double booking (409)
    Conflict,

    /// Order already settled (409)
    AlreadyPaid,

    /// Store busy or out of connections, retry later (503)
    Unavailable,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict | ErrorCode::AlreadyPaid => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// True when the same request may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::Unavailable
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Seconds a client should wait before retrying an `UNAVAILABLE` request.
const RETRY_AFTER_SECS: &str = "1";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let mut response = (self.code.status(), Json(self)).into_response();
        if retryable {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::TableNotFound(_)
            | CoreError::MenuItemNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::ReservationNotFound(_) => ErrorCode::NotFound,
            CoreError::AlreadyPaid(_) => ErrorCode::AlreadyPaid,
            CoreError::SlotConflict { .. } | CoreError::StaleStatus { .. } => ErrorCode::Conflict,
            CoreError::InvalidTransition { .. }
            | CoreError::PartyTooLarge { .. }
            | CoreError::InvalidPaymentAmount { .. }
            | CoreError::Validation(_) => ErrorCode::InvalidArgument,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            err if err.is_transient() => {
                warn!(error = %err, "Transient database failure");
                ApiError::new(ErrorCode::Unavailable, "Database temporarily unavailable, retry shortly")
            }
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::OverlapViolation => ApiError::new(
                ErrorCode::Conflict,
                "Table is already reserved for that time",
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::invalid("Invalid reference")
            }
            DbError::MigrationFailed(e) => {
                error!("Migration failed: {}", e);
                ApiError::internal("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::internal("Database operation failed")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::internal("Database operation failed")
            }
            DbError::Busy(_)
            | DbError::PoolExhausted
            | DbError::ConnectionFailed(_)
            | DbError::TransactionFailed(_) => {
                ApiError::new(ErrorCode::Unavailable, "Database temporarily unavailable, retry shortly")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid(rejection.body_text())
    }
}
