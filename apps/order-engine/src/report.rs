//! # Commission Reports
//!
//! Presentation rows of the per-seller commission summary (rounded to
//! cents) and the per-manufacturer piece-rate earnings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use cocolu_db::{ManufacturerEarningsSummary, SellerCommissionSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SellerCommissionRow {
    pub seller_id: String,
    pub seller_name: String,
    pub order_count: i64,
    pub total_sales_cents: i64,
    pub commission_cents: i64,
}

impl From<&SellerCommissionSummary> for SellerCommissionRow {
    fn from(summary: &SellerCommissionSummary) -> Self {
        SellerCommissionRow {
            seller_id: summary.seller_id.clone(),
            seller_name: summary.seller_name.clone(),
            order_count: summary.order_count,
            total_sales_cents: summary.total_sales().cents(),
            commission_cents: summary.commission_total().round_to_cents().cents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerEarningsRow {
    pub manufacturer_id: String,
    pub manufacturer_name: String,
    pub piece_rate_cents: i64,
    pub order_count: i64,
    pub piece_count: i64,
    pub earned_cents: i64,
}

impl From<&ManufacturerEarningsSummary> for ManufacturerEarningsRow {
    fn from(summary: &ManufacturerEarningsSummary) -> Self {
        ManufacturerEarningsRow {
            manufacturer_id: summary.manufacturer_id.clone(),
            manufacturer_name: summary.manufacturer_name.clone(),
            piece_rate_cents: summary.piece_rate_cents,
            order_count: summary.order_count,
            piece_count: summary.piece_count,
            earned_cents: summary.earned().cents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_rounded_once() {
        let summary = SellerCommissionSummary {
            seller_id: "SELLER-1".to_string(),
            seller_name: "Ana".to_string(),
            order_count: 3,
            total_sales_cents: 300,
            // 12.5 cents exact
            commission_total_units: 125_000,
        };

        let row = SellerCommissionRow::from(&summary);
        assert_eq!(row.commission_cents, 12);
        assert_eq!(row.total_sales_cents, 300);
    }

    #[test]
    fn test_earnings_row_is_camel_case() {
        let summary = ManufacturerEarningsSummary {
            manufacturer_id: "MFR-A".to_string(),
            manufacturer_name: "Taller A".to_string(),
            piece_rate_cents: 1_500,
            order_count: 2,
            piece_count: 4,
            earned_cents: 6_000,
        };

        let json = serde_json::to_value(ManufacturerEarningsRow::from(&summary)).unwrap();
        assert_eq!(json["pieceCount"], 4);
        assert_eq!(json["earnedCents"], 6_000);
        assert_eq!(json["pieceRateCents"], 1_500);
    }
}
