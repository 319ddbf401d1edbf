//! # Repository Module
//!
//! Database repository implementations for the order engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderService                                                          │
//! │       │                                                                 │
//! │       │  db.inventory().stock_levels("RING-1")                         │
//! │       ▼                                                                 │
//! │  InventoryRepository                                                   │
//! │  ├── stock_levels(&self, variant_id)                                   │
//! │  ├── restock(&self, variant_id, location_id, qty)                      │
//! │  └── decrement(conn, ...)   ← only inside OrderRepository::commit      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories own a pool clone. Statements that must share a transaction
//! are free functions over `&mut SqliteConnection` so the commit can pass
//! its transaction through.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Base products, suppliers, variants, locations
//! - [`inventory::InventoryRepository`] - Stock ledger and movements
//! - [`seller::SellerRepository`] - Seller directory and commission reports
//! - [`manufacturer::ManufacturerRepository`] - Manufacturer directory and load
//! - [`config::ConfigRepository`] - Key/value configuration store
//! - [`order::OrderRepository`] - Atomic order commit and read-back

pub mod catalog;
pub mod config;
pub mod inventory;
pub mod manufacturer;
pub mod order;
pub mod seller;

/// Fixtures shared by repository tests.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use cocolu_core::{Location, Manufacturer, QualityTier, Seller, Variant};

    use crate::{Database, DbConfig};

    pub const RING: &str = "RING-1";
    pub const LOCAL: &str = "LOC-LOCAL";
    pub const CHINA: &str = "LOC-CN";
    pub const SELLER: &str = "SELLER-1";

    /// In-memory database with one ring variant stocked 5 @0d + 10 @14d,
    /// a 10% seller and two idle manufacturers.
    pub async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed(&db).await;
        db
    }

    pub async fn seed(db: &Database) {
        let catalog = db.catalog();
        catalog.insert_base_product("BP-RING", "Gold ring", Some("rings")).await.unwrap();
        catalog.insert_supplier("SUP-1", "Shenzhen Gold", Some("CN")).await.unwrap();
        catalog.insert_variant(&variant(RING, 100_000, 95_000)).await.unwrap();

        catalog.insert_location(&location(LOCAL, "LOCAL", 0)).await.unwrap();
        catalog.insert_location(&location(CHINA, "CN", 14)).await.unwrap();

        db.inventory().restock(RING, LOCAL, 5).await.unwrap();
        db.inventory().restock(RING, CHINA, 10).await.unwrap();

        db.sellers()
            .insert(&Seller {
                id: SELLER.to_string(),
                name: "Ana Vendedora".to_string(),
                email: None,
                commission_rate_bps: 1000,
                active: true,
            })
            .await
            .unwrap();

        for id in ["MFR-A", "MFR-B"] {
            db.manufacturers()
                .insert(&Manufacturer {
                    id: id.to_string(),
                    name: format!("Taller {id}"),
                    specialty: "gold".to_string(),
                    active: true,
                    current_load: 0,
                    piece_rate_cents: 1_500,
                })
                .await
                .unwrap();
        }
    }

    pub fn variant(id: &str, sale_price_cents: i64, unit_cost_cents: i64) -> Variant {
        let now = Utc::now();
        Variant {
            id: id.to_string(),
            base_product_id: "BP-RING".to_string(),
            supplier_id: "SUP-1".to_string(),
            sku: format!("SKU-{id}"),
            name: format!("Ring {id}"),
            unit_cost_cents,
            sale_price_cents,
            quality_tier: QualityTier::Premium,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn location(id: &str, code: &str, lead_time_days: i64) -> Location {
        Location {
            id: id.to_string(),
            code: code.to_string(),
            name: format!("Warehouse {code}"),
            lead_time_days,
        }
    }
}
