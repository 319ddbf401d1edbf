//! # cocolu-core: Pure Business Logic for the Order Engine
//!
//! Every rule that decides *how* an order is fulfilled and paid lives here
//! as a pure function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Engine Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    order-engine (orchestrator)                  │   │
//! │  │    validate ──► allocate ──► commission ──► commit ──► receipt  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cocolu-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │allocation │  │commission │  │ delivery  │  │   money   │  │   │
//! │  │   │  greedy   │  │ standard/ │  │ lead time │  │  cents +  │  │   │
//! │  │   │ lead-time │  │   smart   │  │  → date   │  │ fractional│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cocolu-db (Database Layer)                   │   │
//! │  │          stock ledger, orders, atomic commit, migrations        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Variant, Location, StockLevel, Order rows)
//! - [`money`] - Integer money and exact fractional commission amounts
//! - [`allocation`] - Lowest-lead-time-first stock allocation
//! - [`commission`] - Standard and profit-capped commission policies
//! - [`delivery`] - Lead time to calendar delivery date
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use cocolu_core::allocation::allocate;
//! use cocolu_core::types::StockLevel;
//!
//! let stock = vec![
//!     StockLevel::new("LOC-LOCAL", "LOCAL", 0, 5),
//!     StockLevel::new("LOC-CN", "CN", 14, 10),
//! ];
//!
//! let plan = allocate("RING-1", 7, &stock).unwrap();
//! assert_eq!(plan.max_lead_time_days, 14);
//! assert_eq!(plan.total_quantity(), 7);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod commission;
pub mod delivery;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocation::{AllocationPlan, InventorySnapshot, LocationTake};
pub use commission::{CommissionConfig, CommissionMode};
pub use error::{CoreError, ValidationError};
pub use money::{FractionalMoney, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines in one order request.
///
/// ## Business Reason
/// Keeps one commit transaction (and the locks it holds) short.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Maximum unit price or cost, in cents ($9,000,000.00).
///
/// price × MAX_LINE_QUANTITY × MAX_ORDER_LINES × 10_000 bps stays within
/// `i64`, so order totals and exact commissions never overflow.
pub const MAX_UNIT_PRICE_CENTS: i64 = 900_000_000;

/// Maximum accepted lead time for a location, in days.
pub const MAX_LEAD_TIME_DAYS: i64 = 3_650;

/// Maximum length of a caller-supplied lot/batch label.
pub const MAX_LOT_LABEL_LEN: usize = 120;
