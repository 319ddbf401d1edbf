//! # Order Request
//!
//! The payload an HTTP handler deserializes and passes to
//! [`OrderService::place_order`](crate::service::OrderService::place_order).
//!
//! ```json
//! {
//!   "customer": { "name": "Ana", "lastName": "Pérez" },
//!   "sellerId": "SELLER-ANA",
//!   "lines": [
//!     { "variantId": "RING-PRM", "quantity": 7, "lotLabel": "BATCH-GOLD-001" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use cocolu_core::validation::{
    validate_line_count, validate_lot_label, validate_price_cents, validate_quantity, validate_reference,
    validate_required, ValidationResult,
};

const MAX_NAME_LEN: usize = 100;
const MAX_CONTACT_LEN: usize = 40;
const MAX_NOTES_LEN: usize = 1_000;

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub last_name: String,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One requested line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub variant_id: String,
    pub quantity: i64,
    /// Agreed unit price; the variant's current sale price when absent.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    /// Free-text lot/batch label, stored verbatim.
    #[serde(default)]
    pub lot_label: Option<String>,
}

/// A request to place one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer: CustomerInfo,
    /// Earns the commission. No seller, no commission.
    #[serde(default)]
    pub seller_id: Option<String>,
    /// Explicit manufacturer; auto-assigned when absent (if enabled).
    #[serde(default)]
    pub manufacturer_id: Option<String>,
    pub lines: Vec<OrderLineRequest>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PlaceOrderRequest {
    /// Field-level checks. Touches nothing.
    ///
    /// Errors carry the field path, e.g. `lines[2].quantity`.
    pub fn validate(&self) -> ValidationResult<()> {
        self.customer.validate().map_err(|e| e.at("customer"))?;

        if let Some(seller_id) = &self.seller_id {
            validate_reference("seller_id", seller_id)?;
        }
        if let Some(manufacturer_id) = &self.manufacturer_id {
            validate_reference("manufacturer_id", manufacturer_id)?;
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(cocolu_core::ValidationError::TooLong {
                    field: "notes".to_string(),
                    max: MAX_NOTES_LEN,
                });
            }
        }

        validate_line_count(self.lines.len())?;
        for (i, line) in self.lines.iter().enumerate() {
            line.validate().map_err(|e| e.at(&format!("lines[{i}]")))?;
        }

        Ok(())
    }
}

impl CustomerInfo {
    fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name, MAX_NAME_LEN)?;
        validate_required("last_name", &self.last_name, MAX_NAME_LEN)?;
        if let Some(document) = &self.document {
            validate_required("document", document, MAX_CONTACT_LEN)?;
        }
        if let Some(phone) = &self.phone {
            validate_required("phone", phone, MAX_CONTACT_LEN)?;
        }
        Ok(())
    }
}

impl OrderLineRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_reference("variant_id", &self.variant_id)?;
        validate_quantity(self.quantity)?;
        if let Some(price) = self.unit_price_cents {
            validate_price_cents("unit_price_cents", price)?;
        }
        if let Some(label) = &self.lot_label {
            validate_lot_label(label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocolu_core::{ValidationError, MAX_UNIT_PRICE_CENTS};

    fn request() -> PlaceOrderRequest {
        serde_json::from_str(
            r#"{
                "customer": { "name": "Ana", "lastName": "Pérez" },
                "sellerId": "SELLER-1",
                "lines": [
                    { "variantId": "RING-1", "quantity": 7, "lotLabel": "BATCH-GOLD-001" },
                    { "variantId": "NECK-1", "quantity": 1, "unitPriceCents": 30000 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserializes_camel_case() {
        let req = request();
        assert_eq!(req.customer.last_name, "Pérez");
        assert_eq!(req.seller_id.as_deref(), Some("SELLER-1"));
        assert!(req.manufacturer_id.is_none());
        assert_eq!(req.lines[0].lot_label.as_deref(), Some("BATCH-GOLD-001"));
        assert_eq!(req.lines[1].unit_price_cents, Some(30_000));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_field_paths() {
        let mut req = request();
        req.lines[1].quantity = 0;
        assert_eq!(req.validate().unwrap_err().field(), "lines[1].quantity");

        let mut req = request();
        req.customer.name = "  ".to_string();
        assert_eq!(req.validate().unwrap_err().field(), "customer.name");

        let mut req = request();
        req.lines[0].variant_id = String::new();
        assert_eq!(req.validate().unwrap_err().field(), "lines[0].variant_id");

        let mut req = request();
        req.lines[0].unit_price_cents = Some(-1);
        assert_eq!(req.validate().unwrap_err().field(), "lines[0].unit_price_cents");

        let mut req = request();
        req.lines[0].lot_label = Some("x".repeat(500));
        assert_eq!(req.validate().unwrap_err().field(), "lines[0].lot_label");
    }

    #[test]
    fn test_unit_price_out_of_range() {
        let mut req = request();
        req.lines[1].quantity = 2;
        req.lines[1].unit_price_cents = Some(i64::MAX / 2 + 1);
        assert_eq!(
            req.validate().unwrap_err(),
            ValidationError::OutOfRange {
                field: "lines[1].unit_price_cents".to_string(),
                min: 0,
                max: MAX_UNIT_PRICE_CENTS,
            }
        );

        req.lines[1].unit_price_cents = Some(MAX_UNIT_PRICE_CENTS);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_lines_rejected() {
        let mut req = request();
        req.lines.clear();
        assert_eq!(
            req.validate().unwrap_err(),
            ValidationError::Required {
                field: "lines".to_string()
            }
        );
    }

    #[test]
    fn test_bad_seller_reference() {
        let mut req = request();
        req.seller_id = Some("SELLER 1".to_string());
        assert_eq!(req.validate().unwrap_err().field(), "seller_id");
    }
}
