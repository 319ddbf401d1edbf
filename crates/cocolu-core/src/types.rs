//! # Domain Types
//!
//! Core domain types used throughout the order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Variant      │   │    Location     │   │   StockLevel    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, sku        │   │  id, code       │   │  location_id    │       │
//! │  │  unit_cost      │   │  lead_time_days │   │  lead_time_days │       │
//! │  │  sale_price     │   └─────────────────┘   │  quantity       │       │
//! │  │  quality_tier   │                         └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │──►│   OrderLine     │──►│ LineAllocation  │       │
//! │  │  ─────────────  │1 *│  ─────────────  │1 *│  ─────────────  │       │
//! │  │  delivery_date  │   │  unit price/cost│   │  location_id    │       │
//! │  │  totals         │   │  commission     │   │  quantity       │       │
//! │  │  seller, mfr    │   │  lot_label      │   │  lead_time_days │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Order lines freeze unit price and unit cost at order time. A later price
//! change on the variant never alters a committed order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{FractionalMoney, Money};

// =============================================================================
// Commission Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (seller rate), 5000 bps = 50% (max profit share)
///
/// Used for both the seller commission rate and the smart-mode profit cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// 100% in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        CommissionRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Parses a percentage string such as `"50"` or `"37.5"`.
    ///
    /// ## Rules
    /// - Must parse as a finite number
    /// - Must be between 0 and 100 inclusive
    ///
    /// ```rust
    /// use cocolu_core::types::CommissionRate;
    ///
    /// assert_eq!(CommissionRate::parse_percentage("field", "37.5").unwrap().bps(), 3750);
    /// assert!(CommissionRate::parse_percentage("field", "120").is_err());
    /// assert!(CommissionRate::parse_percentage("field", "abc").is_err());
    /// ```
    pub fn parse_percentage(field: &str, raw: &str) -> Result<Self, ValidationError> {
        let pct: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: format!("'{}' is not a number", raw.trim()),
            })?;

        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: 100,
            });
        }

        Ok(CommissionRate::from_percentage(pct))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

// =============================================================================
// Quality Tier
// =============================================================================

/// Quality tier of a sellable variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Standard,
    Premium,
    Luxury,
}

impl Default for QualityTier {
    fn default() -> Self {
        QualityTier::Standard
    }
}

// =============================================================================
// Variant
// =============================================================================

/// A sellable SKU of a base product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Variant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning base product.
    pub base_product_id: String,

    /// Supplier of this variant.
    pub supplier_id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Unit cost in cents.
    pub unit_cost_cents: i64,

    /// Unit sale price in cents.
    pub sale_price_cents: i64,

    /// Quality tier.
    pub quality_tier: QualityTier,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// Returns the unit cost as Money.
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    /// Returns the sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }
}

// =============================================================================
// Location
// =============================================================================

/// A stock-holding site.
///
/// `lead_time_days == 0` conventionally denotes local stock; it gets no
/// special treatment beyond sorting first.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Location {
    pub id: String,
    /// Human code, e.g. "LOCAL", "CN".
    pub code: String,
    pub name: String,
    /// Days needed to fulfill stock drawn from here.
    pub lead_time_days: i64,
}

// =============================================================================
// Stock Level
// =============================================================================

/// Available quantity of one variant at one location, joined with the
/// location's lead time. Input to the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub location_id: String,
    pub location_code: String,
    pub lead_time_days: i64,
    pub quantity: i64,
}

impl StockLevel {
    /// Creates a stock level (mostly used by tests and seeds).
    pub fn new(
        location_id: impl Into<String>,
        location_code: impl Into<String>,
        lead_time_days: i64,
        quantity: i64,
    ) -> Self {
        StockLevel {
            location_id: location_id.into(),
            location_code: location_code.into(),
            lead_time_days,
            quantity,
        }
    }
}

// =============================================================================
// Seller & Manufacturer
// =============================================================================

/// A seller earning commission on orders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Seller {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    /// Commission rate in basis points (1000 = 10%).
    pub commission_rate_bps: i64,
    pub active: bool,
}

impl Seller {
    /// Returns the commission rate.
    pub fn commission_rate(&self) -> CommissionRate {
        let bps = self.commission_rate_bps.clamp(0, CommissionRate::MAX_BPS as i64);
        CommissionRate::from_bps(bps as u32)
    }
}

/// A manufacturer that orders are assigned to for production.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub active: bool,
    /// Number of orders currently assigned.
    pub current_load: i64,
    /// Earned per piece produced.
    pub piece_rate_cents: i64,
}

impl Manufacturer {
    pub fn piece_rate(&self) -> Money {
        Money::from_cents(self.piece_rate_cents)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Delivery status of an order. Only `Pending` is produced by the engine;
/// later transitions belong to downstream workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Delivered,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_last_name: String,
    pub customer_document: Option<String>,
    pub customer_phone: Option<String>,
    pub seller_id: Option<String>,
    pub manufacturer_id: Option<String>,
    pub status: OrderStatus,
    /// Σ unit_price × quantity, in cents.
    pub subtotal_cents: i64,
    /// Σ unit_cost × quantity, in cents.
    pub cost_total_cents: i64,
    /// Σ line commission in 1/10000 cent (unrounded).
    pub commission_total_units: i64,
    /// Maximum lead time over all lines.
    pub max_lead_time_days: i64,
    #[ts(as = "String")]
    pub delivery_date: NaiveDate,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the exact commission total.
    #[inline]
    pub fn commission_total(&self) -> FractionalMoney {
        FractionalMoney::from_units(self.commission_total_units)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line of a committed order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    /// Position in the original request (0-based).
    pub line_no: i64,
    pub variant_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    /// Unit cost in cents at time of order (frozen).
    pub unit_cost_cents: i64,
    /// Line commission in 1/10000 cent (unrounded).
    pub commission_units: i64,
    /// Caller-supplied lot/batch label, stored verbatim.
    pub lot_label: Option<String>,
    pub max_lead_time_days: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the line revenue as Money.
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// Returns the exact line commission.
    #[inline]
    pub fn commission(&self) -> FractionalMoney {
        FractionalMoney::from_units(self.commission_units)
    }
}

/// One persisted (location, quantity) pair drawn for an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LineAllocation {
    pub line_id: String,
    pub location_id: String,
    pub location_code: String,
    pub quantity: i64,
    pub lead_time_days: i64,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Kind of stock movement recorded in the audit ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock drawn by a committed order.
    Sale,
    /// Stock added by an explicit restock.
    Restock,
}

/// An entry of the stock movement ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub variant_id: String,
    pub location_id: String,
    pub kind: MovementKind,
    /// Signed change (negative for sales).
    pub quantity_delta: i64,
    /// Order id for sales.
    pub reference_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_bps() {
        let rate = CommissionRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_rate_from_percentage() {
        assert_eq!(CommissionRate::from_percentage(7.5).bps(), 750);
        assert_eq!(CommissionRate::from_percentage(50.0).bps(), 5000);
    }

    #[test]
    fn test_parse_percentage_bounds() {
        assert_eq!(CommissionRate::parse_percentage("share", "0").unwrap().bps(), 0);
        assert_eq!(CommissionRate::parse_percentage("share", " 100 ").unwrap().bps(), 10_000);
        assert!(CommissionRate::parse_percentage("share", "-1").is_err());
        assert!(CommissionRate::parse_percentage("share", "NaN").is_err());
    }

    #[test]
    fn test_seller_rate_clamped() {
        let seller = Seller {
            id: "s1".to_string(),
            name: "Ana".to_string(),
            email: None,
            commission_rate_bps: 1000,
            active: true,
        };
        assert_eq!(seller.commission_rate().bps(), 1000);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(QualityTier::default(), QualityTier::Standard);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
