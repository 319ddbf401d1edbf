//! # Order Receipt
//!
//! What the caller gets back for a committed order. Also rebuilt from the
//! database for a stored order.
//!
//! Commission amounts are exact until this point; here they are rounded to
//! cents, each line and the total independently. The rounded line amounts
//! may therefore differ from the rounded total by a cent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use cocolu_core::{LineAllocation, LocationTake, Order, OrderLine, OrderStatus};
use cocolu_db::OrderDraft;

/// One line of the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub line_id: String,
    pub variant_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub commission_cents: i64,
    pub lot_label: Option<String>,
    pub max_lead_time_days: i64,
    /// Where the units come from, fastest location first.
    pub allocation: Vec<LocationTake>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptTotals {
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub commission_cents: i64,
}

/// A committed order as presented to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    pub status: OrderStatus,
    pub seller_id: Option<String>,
    pub manufacturer_id: Option<String>,
    #[ts(as = "String")]
    pub delivery_date_estimate: NaiveDate,
    pub max_lead_time_days: i64,
    pub lines: Vec<ReceiptLine>,
    pub totals: ReceiptTotals,
}

impl OrderReceipt {
    /// Receipt for an order just committed from `draft`.
    pub fn from_draft(order: &Order, draft: &OrderDraft) -> Self {
        let lines = draft
            .lines
            .iter()
            .map(|line| ReceiptLine {
                line_id: line.line_id.clone(),
                variant_id: line.variant_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.unit_price_cents * line.quantity,
                commission_cents: line.commission.round_to_cents().cents(),
                lot_label: line.lot_label.clone(),
                max_lead_time_days: line.plan.max_lead_time_days,
                allocation: line.plan.takes.clone(),
            })
            .collect();

        Self::assemble(order, lines)
    }

    /// Receipt for a stored order, from its lines and their allocations.
    pub fn from_stored(order: &Order, lines: Vec<(OrderLine, Vec<LineAllocation>)>) -> Self {
        let lines = lines
            .into_iter()
            .map(|(line, allocations)| ReceiptLine {
                line_total_cents: line.revenue().cents(),
                commission_cents: line.commission().round_to_cents().cents(),
                allocation: allocations
                    .into_iter()
                    .map(|a| LocationTake {
                        location_id: a.location_id,
                        location_code: a.location_code,
                        lead_time_days: a.lead_time_days,
                        quantity: a.quantity,
                    })
                    .collect(),
                line_id: line.id,
                variant_id: line.variant_id,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                lot_label: line.lot_label,
                max_lead_time_days: line.max_lead_time_days,
            })
            .collect();

        Self::assemble(order, lines)
    }

    fn assemble(order: &Order, lines: Vec<ReceiptLine>) -> Self {
        let totals = ReceiptTotals {
            item_count: lines.iter().map(|l| l.quantity).sum(),
            subtotal_cents: order.subtotal_cents,
            commission_cents: order.commission_total().round_to_cents().cents(),
        };

        OrderReceipt {
            order_id: order.id.clone(),
            status: order.status,
            seller_id: order.seller_id.clone(),
            manufacturer_id: order.manufacturer_id.clone(),
            delivery_date_estimate: order.delivery_date,
            max_lead_time_days: order.max_lead_time_days,
            lines,
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order(commission_units: i64) -> Order {
        Order {
            id: "ORD-1".to_string(),
            customer_name: "Ana".to_string(),
            customer_last_name: "Pérez".to_string(),
            customer_document: None,
            customer_phone: None,
            seller_id: Some("SELLER-1".to_string()),
            manufacturer_id: None,
            status: OrderStatus::Pending,
            subtotal_cents: 300,
            cost_total_cents: 0,
            commission_total_units: commission_units,
            max_lead_time_days: 14,
            delivery_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn line(id: &str, commission_units: i64) -> OrderLine {
        OrderLine {
            id: id.to_string(),
            order_id: "ORD-1".to_string(),
            line_no: 0,
            variant_id: "RING-1".to_string(),
            quantity: 1,
            unit_price_cents: 100,
            unit_cost_cents: 0,
            commission_units,
            lot_label: Some("LOT-7".to_string()),
            max_lead_time_days: 14,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rounds_only_at_presentation() {
        // three lines of 0.5 cent each: 1.5 cents exact
        let half_cent = 5_000;
        let stored = (0..3)
            .map(|i| (line(&format!("L{i}"), half_cent), Vec::new()))
            .collect();

        let receipt = OrderReceipt::from_stored(&order(3 * half_cent), stored);

        // each line rounds half-even to 0, the exact total to 2
        assert!(receipt.lines.iter().all(|l| l.commission_cents == 0));
        assert_eq!(receipt.totals.commission_cents, 2);
        assert_eq!(receipt.totals.item_count, 3);
    }

    #[test]
    fn test_stored_allocations_become_takes() {
        let allocations = vec![LineAllocation {
            line_id: "L0".to_string(),
            location_id: "LOC-CN".to_string(),
            location_code: "CN".to_string(),
            quantity: 1,
            lead_time_days: 14,
        }];

        let receipt = OrderReceipt::from_stored(&order(0), vec![(line("L0", 0), allocations)]);
        let take = &receipt.lines[0].allocation[0];
        assert_eq!(take.location_code, "CN");
        assert_eq!(take.quantity, 1);
        assert_eq!(receipt.lines[0].lot_label.as_deref(), Some("LOT-7"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let receipt = OrderReceipt::from_stored(&order(0), Vec::new());
        let json = serde_json::to_value(&receipt).unwrap();

        assert_eq!(json["orderId"], "ORD-1");
        assert_eq!(json["deliveryDateEstimate"], "2024-03-15");
        assert_eq!(json["totals"]["subtotalCents"], 300);
    }
}
