//! # Stock Allocation
//!
//! Splits a requested quantity of one variant across stock locations,
//! drawing from the lowest lead time first.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request 7 × RING-1                                                     │
//! │                                                                         │
//! │  1. Drop levels with quantity <= 0                                      │
//! │  2. Sort by (lead_time_days, location_id)                               │
//! │                                                                         │
//! │     LOCAL  @0d   ██████████ 5    take 5   remaining 2                  │
//! │     CN     @14d  ████████████████████ 10  take 2   remaining 0  ✓      │
//! │                                                                         │
//! │  3. Sum < requested?  → InsufficientStock, nothing taken                │
//! │  4. max_lead_time_days = max over locations with take > 0  → 14        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Allocation is read-only. Decrements happen later inside the commit
//! transaction, which re-checks every take against the stored quantity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::StockLevel;

// =============================================================================
// Allocation Plan
// =============================================================================

/// Quantity drawn from one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LocationTake {
    pub location_id: String,
    pub location_code: String,
    pub lead_time_days: i64,
    pub quantity: i64,
}

/// How a requested quantity of one variant is sourced.
///
/// `takes` is ordered by ascending lead time and every take is positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPlan {
    pub variant_id: String,
    pub takes: Vec<LocationTake>,
    /// Maximum lead time among locations actually drawn from.
    pub max_lead_time_days: i64,
}

impl AllocationPlan {
    /// Sum of all takes. Equals the requested quantity.
    pub fn total_quantity(&self) -> i64 {
        self.takes.iter().map(|t| t.quantity).sum()
    }

    /// Quantity drawn from the given location (0 if untouched).
    pub fn taken_from(&self, location_id: &str) -> i64 {
        self.takes
            .iter()
            .filter(|t| t.location_id == location_id)
            .map(|t| t.quantity)
            .sum()
    }
}

// =============================================================================
// Allocator
// =============================================================================

/// Allocates `requested` units of a variant across `levels`.
///
/// ## Errors
/// - [`CoreError::InvalidQuantity`] if `requested <= 0`
/// - [`CoreError::InsufficientStock`] if the positive levels sum to less
///   than `requested` (including a variant with no stock at all)
///
/// ## Example
/// ```rust
/// use cocolu_core::allocation::allocate;
/// use cocolu_core::types::StockLevel;
///
/// let stock = vec![
///     StockLevel::new("LOC-CN", "CN", 14, 10),
///     StockLevel::new("LOC-LOCAL", "LOCAL", 0, 5),
/// ];
///
/// let plan = allocate("RING-1", 3, &stock).unwrap();
/// assert_eq!(plan.takes.len(), 1);
/// assert_eq!(plan.taken_from("LOC-LOCAL"), 3);
/// assert_eq!(plan.max_lead_time_days, 0);
/// ```
pub fn allocate(variant_id: &str, requested: i64, levels: &[StockLevel]) -> CoreResult<AllocationPlan> {
    if requested <= 0 {
        return Err(CoreError::InvalidQuantity {
            variant_id: variant_id.to_string(),
            requested,
        });
    }

    let mut candidates: Vec<&StockLevel> = levels.iter().filter(|l| l.quantity > 0).collect();
    candidates.sort_by(|a, b| {
        a.lead_time_days
            .cmp(&b.lead_time_days)
            .then_with(|| a.location_id.cmp(&b.location_id))
    });

    let available: i64 = candidates.iter().map(|l| l.quantity).sum();
    if available < requested {
        return Err(CoreError::InsufficientStock {
            variant_id: variant_id.to_string(),
            available,
            requested,
        });
    }

    let mut remaining = requested;
    let mut takes = Vec::new();

    for level in candidates {
        if remaining == 0 {
            break;
        }

        let quantity = remaining.min(level.quantity);
        remaining -= quantity;

        takes.push(LocationTake {
            location_id: level.location_id.clone(),
            location_code: level.location_code.clone(),
            lead_time_days: level.lead_time_days,
            quantity,
        });
    }

    let max_lead_time_days = takes.iter().map(|t| t.lead_time_days).max().unwrap_or(0);

    Ok(AllocationPlan {
        variant_id: variant_id.to_string(),
        takes,
        max_lead_time_days,
    })
}

/// Maximum lead time across the plans of all lines of an order.
///
/// The order ships once its slowest line is ready.
pub fn order_lead_time<'a>(plans: impl IntoIterator<Item = &'a AllocationPlan>) -> i64 {
    plans
        .into_iter()
        .map(|p| p.max_lead_time_days)
        .max()
        .unwrap_or(0)
}

// =============================================================================
// Inventory Snapshot
// =============================================================================

/// Stock levels for several variants, read once per order.
///
/// Allocating through the snapshot subtracts each plan from the in-memory
/// levels, so two lines of the same order for the same variant never count
/// the same unit twice.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    levels: HashMap<String, Vec<StockLevel>>,
}

impl InventorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the stock levels of a variant, replacing earlier ones.
    pub fn insert(&mut self, variant_id: impl Into<String>, levels: Vec<StockLevel>) {
        self.levels.insert(variant_id.into(), levels);
    }

    pub fn contains(&self, variant_id: &str) -> bool {
        self.levels.contains_key(variant_id)
    }

    /// Levels remaining for a variant after earlier allocations.
    pub fn levels(&self, variant_id: &str) -> &[StockLevel] {
        self.levels.get(variant_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Allocates against the remaining levels and applies the plan.
    ///
    /// A failed allocation leaves the snapshot unchanged.
    pub fn allocate(&mut self, variant_id: &str, requested: i64) -> CoreResult<AllocationPlan> {
        let plan = allocate(variant_id, requested, self.levels(variant_id))?;

        if let Some(levels) = self.levels.get_mut(variant_id) {
            for take in &plan.takes {
                if let Some(level) = levels.iter_mut().find(|l| l.location_id == take.location_id) {
                    level.quantity -= take.quantity;
                }
            }
        }

        Ok(plan)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn local_and_china() -> Vec<StockLevel> {
        vec![
            StockLevel::new("LOC-LOCAL", "LOCAL", 0, 5),
            StockLevel::new("LOC-CN", "CN", 14, 10),
        ]
    }

    #[test]
    fn test_scenario_a_local_only() {
        let plan = allocate("RING-1", 3, &local_and_china()).unwrap();

        assert_eq!(plan.takes.len(), 1);
        assert_eq!(plan.taken_from("LOC-LOCAL"), 3);
        assert_eq!(plan.taken_from("LOC-CN"), 0);
        assert_eq!(plan.max_lead_time_days, 0);
    }

    #[test]
    fn test_scenario_b_spills_to_next_location() {
        let plan = allocate("RING-1", 7, &local_and_china()).unwrap();

        assert_eq!(plan.taken_from("LOC-LOCAL"), 5);
        assert_eq!(plan.taken_from("LOC-CN"), 2);
        assert_eq!(plan.takes[0].location_code, "LOCAL");
        assert_eq!(plan.max_lead_time_days, 14);
    }

    #[test]
    fn test_scenario_e_insufficient_stock() {
        let err = allocate("RING-1", 20, &local_and_china()).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                variant_id: "RING-1".to_string(),
                available: 15,
                requested: 20,
            }
        );
    }

    #[test]
    fn test_invalid_quantity() {
        assert!(matches!(
            allocate("RING-1", 0, &local_and_china()),
            Err(CoreError::InvalidQuantity { requested: 0, .. })
        ));
        assert!(matches!(
            allocate("RING-1", -4, &local_and_china()),
            Err(CoreError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_no_stock_anywhere() {
        let err = allocate("RING-1", 1, &[]).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 0, .. }));

        let empty = vec![StockLevel::new("LOC-LOCAL", "LOCAL", 0, 0)];
        assert!(allocate("RING-1", 1, &empty).is_err());
    }

    #[test]
    fn test_ties_broken_by_location_id() {
        let stock = vec![
            StockLevel::new("LOC-B", "B", 3, 4),
            StockLevel::new("LOC-A", "A", 3, 4),
        ];
        let plan = allocate("RING-1", 5, &stock).unwrap();

        assert_eq!(plan.takes[0].location_id, "LOC-A");
        assert_eq!(plan.taken_from("LOC-A"), 4);
        assert_eq!(plan.taken_from("LOC-B"), 1);
    }

    #[test]
    fn test_exhaustive_and_lowest_lead_first() {
        let stock = vec![
            StockLevel::new("LOC-US", "US", 5, 3),
            StockLevel::new("LOC-CN", "CN", 14, 6),
            StockLevel::new("LOC-LOCAL", "LOCAL", 0, 2),
            StockLevel::new("LOC-EMPTY", "EMPTY", 1, 0),
        ];
        let total: i64 = stock.iter().map(|l| l.quantity).sum();

        for requested in 1..=total {
            let plan = allocate("V", requested, &stock).unwrap();
            assert_eq!(plan.total_quantity(), requested);

            // every location before the last one drawn is exhausted
            let (last, earlier) = plan.takes.split_last().unwrap();
            for take in earlier {
                let level = stock.iter().find(|l| l.location_id == take.location_id).unwrap();
                assert_eq!(take.quantity, level.quantity);
                assert!(take.lead_time_days <= last.lead_time_days);
            }

            let expected_lead = plan.takes.iter().map(|t| t.lead_time_days).max().unwrap();
            assert_eq!(plan.max_lead_time_days, expected_lead);
            assert!(plan.takes.iter().all(|t| t.quantity > 0));
        }
    }

    #[test]
    fn test_snapshot_shares_stock_between_lines() {
        let mut snapshot = InventorySnapshot::new();
        snapshot.insert("RING-1", local_and_china());

        let first = snapshot.allocate("RING-1", 4).unwrap();
        assert_eq!(first.max_lead_time_days, 0);

        let second = snapshot.allocate("RING-1", 3).unwrap();
        assert_eq!(second.taken_from("LOC-LOCAL"), 1);
        assert_eq!(second.taken_from("LOC-CN"), 2);
        assert_eq!(second.max_lead_time_days, 14);

        assert!(snapshot.allocate("RING-1", 9).is_err());
        assert_eq!(snapshot.levels("RING-1")[1].quantity, 8);
    }

    #[test]
    fn test_order_lead_time_is_max_over_lines() {
        let a = allocate("A", 3, &local_and_china()).unwrap();
        let b = allocate("B", 7, &local_and_china()).unwrap();

        assert_eq!(order_lead_time([&a, &b]), 14);
        assert_eq!(order_lead_time(std::iter::empty()), 0);
    }
}
