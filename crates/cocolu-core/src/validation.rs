//! # Validation Module
//!
//! Input validation for order requests and inventory writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (out of scope)                                  │
//! │  └── Deserialization into PlaceOrderRequest                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Order orchestrator (Validating state)                        │
//! │  └── THIS MODULE: field-level business rules                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0), CHECK (lead_time_days >= 0)                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures here never touch a resource.

use crate::error::ValidationError;
use crate::{
    MAX_LEAD_TIME_DAYS, MAX_LINE_QUANTITY, MAX_LOT_LABEL_LEN, MAX_ORDER_LINES, MAX_UNIT_PRICE_CENTS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field (names, references).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
///
/// ## Example
/// ```rust
/// use cocolu_core::validation::validate_required;
///
/// assert!(validate_required("customer.name", "Ana", 100).is_ok());
/// assert!(validate_required("customer.name", "   ", 100).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
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

/// Validates an entity reference (variant, seller, manufacturer id).
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace or control characters
pub fn validate_reference(field: &str, id: &str) -> ValidationResult<()> {
    validate_required(field, id, 64)?;

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a lot/batch traceability label.
///
/// The label is caller-defined and stored verbatim, so only the minimum is
/// checked: a length cap and no control characters.
///
/// ## Example
/// ```rust
/// use cocolu_core::validation::validate_lot_label;
///
/// assert!(validate_lot_label("BATCH-GOLD-001").is_ok());
/// assert!(validate_lot_label("lote 7 / taller norte").is_ok());
/// assert!(validate_lot_label("bad\u{0}label").is_err());
/// ```
pub fn validate_lot_label(label: &str) -> ValidationResult<()> {
    if label.chars().count() > MAX_LOT_LABEL_LEN {
        return Err(ValidationError::TooLong {
            field: "lot_label".to_string(),
            max: MAX_LOT_LABEL_LEN,
        });
    }

    if label.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "lot_label".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cost in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - Must not exceed MAX_UNIT_PRICE_CENTS
///
/// ## Example
/// ```rust
/// use cocolu_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("unit_price", 1099).is_ok());
/// assert!(validate_price_cents("unit_price", 0).is_ok());
/// assert!(validate_price_cents("unit_price", -100).is_err());
/// assert!(validate_price_cents("unit_price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a location lead time.
pub fn validate_lead_time_days(days: i64) -> ValidationResult<()> {
    if !(0..=MAX_LEAD_TIME_DAYS).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "lead_time_days".to_string(),
            min: 0,
            max: MAX_LEAD_TIME_DAYS,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in an order.
///
/// ## Rules
/// - At least one line
/// - At most MAX_ORDER_LINES
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if count > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Sr. Tester", 100).is_ok());
        assert!(validate_required("name", "", 100).is_err());
        assert!(validate_required("name", &"A".repeat(101), 100).is_err());
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("variant_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_reference("variant_id", "RING-1").is_ok());
        assert!(validate_reference("variant_id", "").is_err());
        assert!(validate_reference("variant_id", "has space").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents("unit_price", 0).is_ok());
        assert!(validate_price_cents("unit_price", MAX_UNIT_PRICE_CENTS).is_ok());

        assert!(validate_price_cents("unit_price", -1).is_err());
        assert!(validate_price_cents("unit_price", MAX_UNIT_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents("unit_price", i64::MAX / 2 + 1).is_err());
    }

    #[test]
    fn test_max_price_order_fits_in_fractional_units() {
        let worst = MAX_UNIT_PRICE_CENTS
            .checked_mul(MAX_LINE_QUANTITY)
            .and_then(|line| line.checked_mul(MAX_ORDER_LINES as i64))
            .and_then(|order| order.checked_mul(10_000));
        assert!(worst.is_some());
    }

    #[test]
    fn test_validate_lot_label() {
        assert!(validate_lot_label("").is_ok());
        assert!(validate_lot_label("BATCH-GOLD-001").is_ok());
        assert!(validate_lot_label(&"L".repeat(MAX_LOT_LABEL_LEN + 1)).is_err());
        assert!(validate_lot_label("line\nbreak").is_err());
    }

    #[test]
    fn test_validate_lead_time_days() {
        assert!(validate_lead_time_days(0).is_ok());
        assert!(validate_lead_time_days(14).is_ok());
        assert!(validate_lead_time_days(-1).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(MAX_ORDER_LINES + 1).is_err());
    }
}
