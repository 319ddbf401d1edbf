//! # Catalog Repository
//!
//! Base products, suppliers, sellable variants and stock locations.
//!
//! The engine only reads variants (price/cost snapshot) and locations (lead
//! time). Writes exist for seeding and administration.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use cocolu_core::validation::{validate_lead_time_days, validate_price_cents};
use cocolu_core::{Location, Variant};

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Base products & suppliers
    // =========================================================================

    pub async fn insert_base_product(&self, id: &str, name: &str, category: Option<&str>) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO base_products (id, name, category, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_supplier(&self, id: &str, name: &str, country: Option<&str>) -> DbResult<()> {
        sqlx::query("INSERT INTO suppliers (id, name, country, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(id)
            .bind(name)
            .bind(country)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// Gets a variant by ID.
    pub async fn get_variant(&self, id: &str) -> DbResult<Option<Variant>> {
        let variant = sqlx::query_as::<_, Variant>(
            r#"
            SELECT
                id, base_product_id, supplier_id, sku, name,
                unit_cost_cents, sale_price_cents, quality_tier,
                created_at, updated_at
            FROM variants
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Inserts a variant.
    ///
    /// ## Errors
    /// `UniqueViolation` on a duplicate SKU, `ForeignKeyViolation` when the
    /// base product or supplier is unknown, `InvalidValue` when a price or
    /// cost is negative or above MAX_UNIT_PRICE_CENTS.
    pub async fn insert_variant(&self, variant: &Variant) -> DbResult<()> {
        validate_price_cents("unit_cost_cents", variant.unit_cost_cents)
            .and_then(|_| validate_price_cents("sale_price_cents", variant.sale_price_cents))
            .map_err(|e| DbError::InvalidValue(e.to_string()))?;

        debug!(id = %variant.id, sku = %variant.sku, "Inserting variant");

        sqlx::query(
            r#"
            INSERT INTO variants (
                id, base_product_id, supplier_id, sku, name,
                unit_cost_cents, sale_price_cents, quality_tier,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.base_product_id)
        .bind(&variant.supplier_id)
        .bind(&variant.sku)
        .bind(&variant.name)
        .bind(variant.unit_cost_cents)
        .bind(variant.sale_price_cents)
        .bind(variant.quality_tier)
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Changes a variant's sale price. Committed order lines keep their
    /// snapshotted price.
    pub async fn update_sale_price(&self, id: &str, sale_price_cents: i64) -> DbResult<()> {
        validate_price_cents("sale_price_cents", sale_price_cents)
            .map_err(|e| DbError::InvalidValue(e.to_string()))?;

        let result = sqlx::query("UPDATE variants SET sale_price_cents = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(sale_price_cents)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Variant", id));
        }

        Ok(())
    }

    pub async fn count_variants(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variants")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// Inserts a stock location. Lead time must be within 0..=MAX_LEAD_TIME_DAYS.
    pub async fn insert_location(&self, location: &Location) -> DbResult<()> {
        validate_lead_time_days(location.lead_time_days)
            .map_err(|e| DbError::InvalidValue(e.to_string()))?;

        debug!(id = %location.id, code = %location.code, lead_time_days = location.lead_time_days, "Inserting location");

        sqlx::query("INSERT INTO locations (id, code, name, lead_time_days) VALUES (?1, ?2, ?3, ?4)")
            .bind(&location.id)
            .bind(&location.code)
            .bind(&location.name)
            .bind(location.lead_time_days)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_location(&self, id: &str) -> DbResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, code, name, lead_time_days FROM locations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    /// All locations, fastest first.
    pub async fn list_locations(&self) -> DbResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, code, name, lead_time_days FROM locations ORDER BY lead_time_days, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use cocolu_core::{QualityTier, MAX_UNIT_PRICE_CENTS};

    #[tokio::test]
    async fn test_variant_round_trip() {
        let db = seeded_db().await;

        let ring = db.catalog().get_variant(RING).await.unwrap().unwrap();
        assert_eq!(ring.sale_price_cents, 100_000);
        assert_eq!(ring.unit_cost_cents, 95_000);
        assert_eq!(ring.quality_tier, QualityTier::Premium);

        assert!(db.catalog().get_variant("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = seeded_db().await;

        let mut dup = variant("RING-2", 1_000, 500);
        dup.sku = format!("SKU-{RING}");

        let err = db.catalog().insert_variant(&dup).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_supplier_rejected() {
        let db = seeded_db().await;

        let mut orphan = variant("RING-3", 1_000, 500);
        orphan.supplier_id = "SUP-MISSING".to_string();

        let err = db.catalog().insert_variant(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_locations_sorted_by_lead_time() {
        let db = seeded_db().await;
        db.catalog().insert_location(&location("LOC-US", "US", 5)).await.unwrap();

        let codes: Vec<String> = db
            .catalog()
            .list_locations()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.code)
            .collect();
        assert_eq!(codes, vec!["LOCAL", "US", "CN"]);
    }

    #[tokio::test]
    async fn test_negative_lead_time_rejected() {
        let db = seeded_db().await;

        let err = db.catalog().insert_location(&location("LOC-BAD", "BAD", -1)).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn test_update_sale_price() {
        let db = seeded_db().await;

        db.catalog().update_sale_price(RING, 120_000).await.unwrap();
        let ring = db.catalog().get_variant(RING).await.unwrap().unwrap();
        assert_eq!(ring.sale_price_cents, 120_000);

        assert!(db.catalog().update_sale_price("NOPE", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_prices_rejected() {
        let db = seeded_db().await;

        let err = db.catalog().insert_variant(&variant("RING-4", i64::MAX, 500)).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidValue(_)));

        let err = db.catalog().insert_variant(&variant("RING-5", 1_000, -1)).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidValue(_)));

        let err = db
            .catalog()
            .update_sale_price(RING, MAX_UNIT_PRICE_CENTS + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidValue(_)));

        let ring = db.catalog().get_variant(RING).await.unwrap().unwrap();
        assert_eq!(ring.sale_price_cents, 100_000);
        assert!(db.catalog().get_variant("RING-4").await.unwrap().is_none());
    }
}
