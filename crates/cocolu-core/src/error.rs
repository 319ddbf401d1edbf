//! # Error Types
//!
//! Domain-specific error types for cocolu-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cocolu-core errors (this file)                                        │
//! │  ├── CoreError        - Allocation / domain rule failures              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cocolu-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  order-engine errors (app)                                             │
//! │  ├── OrderError       - Typed outcome of one order request             │
//! │  └── ApiError         - What the HTTP layer serializes                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → OrderError → ApiError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Variant has no stock record or does not exist.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Aggregate stock across all locations is below the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Order line (qty: 20)
    ///      │
    ///      ▼
    /// Stock: LOCAL 5 + CN 10 = 15
    ///      │
    ///      ▼
    /// InsufficientStock { variant_id: "RING-1", available: 15, requested: 20 }
    ///      │
    ///      ▼
    /// UI shows: "Only 15 RING-1 available"
    /// ```
    #[error("Insufficient stock for {variant_id}: available {available}, requested {requested}")]
    InsufficientStock {
        variant_id: String,
        available: i64,
        requested: i64,
    },

    /// Requested quantity is zero or negative.
    #[error("Invalid quantity {requested} for {variant_id}: must be positive")]
    InvalidQuantity { variant_id: String, requested: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any resource is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, unparsable percentage).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Returns the offending field name.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }

    /// Prefixes the field with a path such as `lines[2]`.
    ///
    /// ```rust
    /// use cocolu_core::ValidationError;
    ///
    /// let err = ValidationError::MustBePositive { field: "quantity".into() }.at("lines[2]");
    /// assert_eq!(err.field(), "lines[2].quantity");
    /// ```
    pub fn at(self, prefix: &str) -> Self {
        let nest = |field: String| format!("{prefix}.{field}");
        match self {
            ValidationError::Required { field } => ValidationError::Required { field: nest(field) },
            ValidationError::TooLong { field, max } => ValidationError::TooLong {
                field: nest(field),
                max,
            },
            ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
                field: nest(field),
                min,
                max,
            },
            ValidationError::MustBePositive { field } => {
                ValidationError::MustBePositive { field: nest(field) }
            }
            ValidationError::InvalidFormat { field, reason } => ValidationError::InvalidFormat {
                field: nest(field),
                reason,
            },
            ValidationError::NotAllowed { field, allowed } => ValidationError::NotAllowed {
                field: nest(field),
                allowed,
            },
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
