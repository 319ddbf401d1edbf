//! # Manufacturer Repository
//!
//! Manufacturers receive orders for production. Each assigned order adds one
//! unit of `current_load`; auto-assignment picks the least loaded.
//! Manufacturers are paid a flat rate per piece of the orders they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use cocolu_core::validation::validate_price_cents;
use cocolu_core::{Manufacturer, Money};

/// One row of the manufacturer earnings report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ManufacturerEarningsSummary {
    pub manufacturer_id: String,
    pub manufacturer_name: String,
    pub piece_rate_cents: i64,
    pub order_count: i64,
    pub piece_count: i64,
    pub earned_cents: i64,
}

impl ManufacturerEarningsSummary {
    pub fn earned(&self) -> Money {
        Money::from_cents(self.earned_cents)
    }
}

/// Repository for manufacturer database operations.
#[derive(Debug, Clone)]
pub struct ManufacturerRepository {
    pool: SqlitePool,
}

impl ManufacturerRepository {
    /// Creates a new ManufacturerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ManufacturerRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Manufacturer>> {
        let manufacturer = sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name, specialty, active, current_load, piece_rate_cents FROM manufacturers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(manufacturer)
    }

    pub async fn insert(&self, manufacturer: &Manufacturer) -> DbResult<()> {
        validate_price_cents("piece_rate_cents", manufacturer.piece_rate_cents)
            .map_err(|e| DbError::InvalidValue(e.to_string()))?;

        debug!(id = %manufacturer.id, piece_rate = %manufacturer.piece_rate(), "Inserting manufacturer");

        sqlx::query(
            r#"
            INSERT INTO manufacturers (id, name, specialty, active, current_load, piece_rate_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&manufacturer.id)
        .bind(&manufacturer.name)
        .bind(&manufacturer.specialty)
        .bind(manufacturer.active)
        .bind(manufacturer.current_load)
        .bind(manufacturer.piece_rate_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE manufacturers SET active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Manufacturer", id));
        }

        Ok(())
    }

    /// Changes the per-piece rate. Earnings reports use the current rate.
    pub async fn set_piece_rate(&self, id: &str, piece_rate_cents: i64) -> DbResult<()> {
        validate_price_cents("piece_rate_cents", piece_rate_cents)
            .map_err(|e| DbError::InvalidValue(e.to_string()))?;

        let result = sqlx::query("UPDATE manufacturers SET piece_rate_cents = ?2 WHERE id = ?1")
            .bind(id)
            .bind(piece_rate_cents)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Manufacturer", id));
        }

        Ok(())
    }

    /// Active manufacturers, least loaded first.
    pub async fn list_active(&self) -> DbResult<Vec<Manufacturer>> {
        let manufacturers = sqlx::query_as::<_, Manufacturer>(
            r#"
            SELECT id, name, specialty, active, current_load, piece_rate_cents
            FROM manufacturers
            WHERE active = 1
            ORDER BY current_load, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(manufacturers)
    }

    /// Orders, pieces and piece-rate earnings per active manufacturer in
    /// `[from, to)`.
    ///
    /// Manufacturers without orders in the range appear with zeros. Sorted
    /// by earnings, highest first.
    pub async fn earnings_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<ManufacturerEarningsSummary>> {
        let rows = sqlx::query_as::<_, ManufacturerEarningsSummary>(
            r#"
            SELECT
                m.id AS manufacturer_id,
                m.name AS manufacturer_name,
                m.piece_rate_cents,
                COUNT(DISTINCT o.id) AS order_count,
                COALESCE(SUM(l.quantity), 0) AS piece_count,
                COALESCE(SUM(l.quantity), 0) * m.piece_rate_cents AS earned_cents
            FROM manufacturers m
            LEFT JOIN orders o
                ON o.manufacturer_id = m.id
               AND o.status != 'cancelled'
               AND o.created_at >= ?1
               AND o.created_at < ?2
            LEFT JOIN order_lines l ON l.order_id = o.id
            WHERE m.active = 1
            GROUP BY m.id, m.name, m.piece_rate_cents
            ORDER BY earned_cents DESC, m.id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// In-transaction statements
// =============================================================================

/// Id of the active manufacturer with the lowest load (ties by id).
pub(crate) async fn least_loaded(conn: &mut SqliteConnection) -> DbResult<Option<String>> {
    let id: Option<String> = sqlx::query_scalar(
        "SELECT id FROM manufacturers WHERE active = 1 ORDER BY current_load, id LIMIT 1",
    )
    .fetch_optional(&mut *conn)
    .await?;

    Ok(id)
}

/// Charges one order to a manufacturer.
pub(crate) async fn add_load(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let result = sqlx::query("UPDATE manufacturers SET current_load = current_load + 1 WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Manufacturer", id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;

    #[tokio::test]
    async fn test_least_loaded_prefers_lower_load_then_id() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(least_loaded(&mut conn).await.unwrap().as_deref(), Some("MFR-A"));

        add_load(&mut conn, "MFR-A").await.unwrap();
        assert_eq!(least_loaded(&mut conn).await.unwrap().as_deref(), Some("MFR-B"));
    }

    #[tokio::test]
    async fn test_inactive_skipped() {
        let db = seeded_db().await;
        db.manufacturers().set_active("MFR-A", false).await.unwrap();
        db.manufacturers().set_active("MFR-B", false).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(least_loaded(&mut conn).await.unwrap().is_none());
        drop(conn);

        assert!(db.manufacturers().list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_piece_rate() {
        let db = seeded_db().await;

        db.manufacturers().set_piece_rate("MFR-A", 2_500).await.unwrap();
        let mfr = db.manufacturers().get_by_id("MFR-A").await.unwrap().unwrap();
        assert_eq!(mfr.piece_rate(), Money::from_cents(2_500));

        assert!(matches!(
            db.manufacturers().set_piece_rate("MFR-A", -1).await,
            Err(DbError::InvalidValue(_))
        ));
        assert!(matches!(
            db.manufacturers().set_piece_rate("MFR-X", 100).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_earnings_without_orders_lists_zeros() {
        let db = seeded_db().await;
        db.manufacturers().set_active("MFR-B", false).await.unwrap();
        let now = Utc::now();

        let rows = db
            .manufacturers()
            .earnings_summary(now - chrono::Duration::days(1), now + chrono::Duration::days(1))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].manufacturer_id, "MFR-A");
        assert_eq!(rows[0].order_count, 0);
        assert_eq!(rows[0].piece_count, 0);
        assert_eq!(rows[0].earned(), Money::zero());
    }

    #[tokio::test]
    async fn test_add_load_unknown() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert!(matches!(
            add_load(&mut conn, "MFR-X").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
