//! # Order Errors
//!
//! The typed outcome of a failed order request, and the serializable form
//! handed to the HTTP layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Order Engine                       │
//! │                                                                         │
//! │  Validating ── ValidationError ──────────────┐                          │
//! │                                              │                          │
//! │  Allocating ── CoreError::InsufficientStock ─┤                          │
//! │                                              ▼                          │
//! │  Committing ── DbError ─────────────────► OrderError ──► ApiError       │
//! │     StockConflict / Busy ──► ConcurrencyConflict   (retryable)          │
//! │     Timeout              ──► Timeout               (retryable)          │
//! │     NotFound             ──► NotFound                                   │
//! │     anything else        ──► Persistence                                │
//! │                                                                         │
//! │  Every variant is returned only after the transaction rolled back.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use cocolu_core::{CoreError, ValidationError};
use cocolu_db::DbError;

/// Why an order was not placed. No durable state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Malformed request, with the offending field path.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced variant, seller or manufacturer does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A line asks for more than all locations hold together.
    #[error("Line {line}: insufficient stock for {variant_id}: available {available}, requested {requested}")]
    InsufficientStock {
        line: usize,
        variant_id: String,
        available: i64,
        requested: i64,
    },

    /// Another writer changed the stock between planning and commit.
    #[error("Concurrent update, please retry: {0}")]
    ConcurrencyConflict(String),

    /// The commit outlasted its deadline and was rolled back.
    #[error("Order commit timed out after {0:?}")]
    Timeout(Duration),

    /// Unexpected storage failure.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderError {
    /// True if resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::ConcurrencyConflict(_) | OrderError::Timeout(_))
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        OrderError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Maps an allocation failure of request line `line`.
    pub fn at_line(line: usize, err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                variant_id,
                available,
                requested,
            } => OrderError::InsufficientStock {
                line,
                variant_id,
                available,
                requested,
            },
            CoreError::InvalidQuantity { .. } => OrderError::Validation(
                ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                }
                .at(&format!("lines[{line}]")),
            ),
            CoreError::VariantNotFound(id) => OrderError::not_found("Variant", id),
            CoreError::Validation(e) => OrderError::Validation(e.at(&format!("lines[{line}]"))),
        }
    }
}

impl From<DbError> for OrderError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => OrderError::NotFound { entity, id },
            err @ (DbError::StockConflict { .. } | DbError::Busy(_)) => {
                OrderError::ConcurrencyConflict(err.to_string())
            }
            DbError::Timeout(after) => OrderError::Timeout(after),
            other => OrderError::Persistence(other.to_string()),
        }
    }
}

/// Result type for engine operations.
pub type OrderResult<T> = Result<T, OrderError>;

// =============================================================================
// API Error
// =============================================================================

/// What the HTTP layer receives when an order fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Line 0: insufficient stock for RING-1: available 15, requested 20",
///   "retryable": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Whether the caller may resubmit unchanged.
    pub retryable: bool,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Not enough stock across all locations (409)
    InsufficientStock,

    /// Lost a race with another order (409, retry)
    ConcurrencyConflict,

    /// Commit deadline expired (503, retry)
    Timeout,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable: matches!(code, ErrorCode::ConcurrencyConflict | ErrorCode::Timeout),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::Validation(_) => ApiError::new(ErrorCode::ValidationError, message),
            OrderError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, message),
            OrderError::InsufficientStock { .. } => ApiError::new(ErrorCode::InsufficientStock, message),
            OrderError::ConcurrencyConflict(_) => ApiError::new(ErrorCode::ConcurrencyConflict, message),
            OrderError::Timeout(_) => ApiError::new(ErrorCode::Timeout, message),
            OrderError::Persistence(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Order persistence failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            OrderError::Internal(e) => {
                tracing::error!("Internal order engine error: {}", e);
                ApiError::new(ErrorCode::Internal, "Internal error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conflicts_are_retryable() {
        let err: OrderError = DbError::StockConflict {
            variant_id: "RING-1".to_string(),
            location_id: "LOC-LOCAL".to_string(),
            requested: 5,
        }
        .into();
        assert!(matches!(err, OrderError::ConcurrencyConflict(_)));
        assert!(err.is_retryable());

        let busy: OrderError = DbError::Busy("database is locked".to_string()).into();
        assert!(busy.is_retryable());

        let timeout: OrderError = DbError::Timeout(Duration::from_secs(1)).into();
        assert_eq!(timeout, OrderError::Timeout(Duration::from_secs(1)));
        assert!(timeout.is_retryable());
    }

    #[test]
    fn test_permanent_errors() {
        let stock = OrderError::at_line(
            2,
            CoreError::InsufficientStock {
                variant_id: "RING-1".to_string(),
                available: 15,
                requested: 20,
            },
        );
        assert!(!stock.is_retryable());
        assert_eq!(
            stock.to_string(),
            "Line 2: insufficient stock for RING-1: available 15, requested 20"
        );

        let missing: OrderError = DbError::not_found("Manufacturer", "MFR-X").into();
        assert_eq!(missing, OrderError::not_found("Manufacturer", "MFR-X"));
        assert!(!missing.is_retryable());

        let broken: OrderError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert!(matches!(broken, OrderError::Persistence(_)));
        assert!(!broken.is_retryable());
    }

    #[test]
    fn test_invalid_quantity_maps_to_line_field() {
        let err = OrderError::at_line(
            1,
            CoreError::InvalidQuantity {
                variant_id: "RING-1".to_string(),
                requested: 0,
            },
        );
        match err {
            OrderError::Validation(v) => assert_eq!(v.field(), "lines[1].quantity"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_serialization() {
        let api: ApiError = OrderError::ConcurrencyConflict("stock changed".to_string()).into();
        let json = serde_json::to_value(&api).unwrap();

        assert_eq!(json["code"], "CONCURRENCY_CONFLICT");
        assert_eq!(json["retryable"], true);

        let api: ApiError = OrderError::Persistence("secret table name".to_string()).into();
        assert_eq!(api.code, ErrorCode::DatabaseError);
        assert_eq!(api.message, "Database operation failed");
        assert!(!api.retryable);
    }
}
