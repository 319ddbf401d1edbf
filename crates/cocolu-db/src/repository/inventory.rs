//! # Inventory Repository
//!
//! The stock ledger: per-location quantities and the movement audit trail.
//!
//! ## Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock_entries.quantity >= 0, always.                                   │
//! │                                                                         │
//! │  Enforced twice:                                                        │
//! │   1. CHECK (quantity >= 0) in the schema                               │
//! │   2. Conditional decrement:                                            │
//! │        UPDATE stock_entries SET quantity = quantity - :take            │
//! │        WHERE variant_id = :v AND location_id = :l                       │
//! │          AND quantity >= :take                                          │
//! │      0 rows affected → StockConflict (the plan was computed from       │
//! │      a stale read), and the enclosing transaction rolls back.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every quantity change writes a `stock_movements` row in the same
//! transaction as the change itself.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cocolu_core::{MovementKind, StockLevel, StockMovement};

/// Repository for the stock ledger.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Positive stock of a variant, joined with each location's lead time.
    ///
    /// Sorted by `(lead_time_days, location_id)`, the allocator's order.
    pub async fn stock_levels(&self, variant_id: &str) -> DbResult<Vec<StockLevel>> {
        debug!(variant_id = %variant_id, "Loading stock levels");

        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT
                se.location_id,
                l.code AS location_code,
                l.lead_time_days,
                se.quantity
            FROM stock_entries se
            JOIN locations l ON l.id = se.location_id
            WHERE se.variant_id = ?1 AND se.quantity > 0
            ORDER BY l.lead_time_days, se.location_id
            "#,
        )
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Sum of stock across all locations.
    pub async fn total_available(&self, variant_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_entries WHERE variant_id = ?1",
        )
        .bind(variant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Quantity at one location (0 when no entry exists).
    pub async fn quantity_at(&self, variant_id: &str, location_id: &str) -> DbResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock_entries WHERE variant_id = ?1 AND location_id = ?2",
        )
        .bind(variant_id)
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Adds stock at a location and records a `restock` movement.
    ///
    /// Creates the stock entry on first restock. Returns the new quantity.
    pub async fn restock(&self, variant_id: &str, location_id: &str, quantity: i64) -> DbResult<i64> {
        if quantity <= 0 {
            return Err(DbError::InvalidValue(format!(
                "restock quantity must be positive, got {quantity}"
            )));
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO stock_entries (variant_id, location_id, quantity, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (variant_id, location_id)
            DO UPDATE SET quantity = quantity + excluded.quantity, updated_at = excluded.updated_at
            "#,
        )
        .bind(variant_id)
        .bind(location_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        record_movement(&mut *tx, variant_id, location_id, MovementKind::Restock, quantity, None).await?;

        let updated: i64 = sqlx::query_scalar(
            "SELECT quantity FROM stock_entries WHERE variant_id = ?1 AND location_id = ?2",
        )
        .bind(variant_id)
        .bind(location_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(variant_id = %variant_id, location_id = %location_id, added = quantity, quantity = updated, "Restocked");
        Ok(updated)
    }

    /// Movement history of a variant, oldest first.
    pub async fn movements(&self, variant_id: &str) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, variant_id, location_id, kind, quantity_delta, reference_id, created_at
            FROM stock_movements
            WHERE variant_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Movements written by one order.
    pub async fn movements_for_reference(&self, reference_id: &str) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, variant_id, location_id, kind, quantity_delta, reference_id, created_at
            FROM stock_movements
            WHERE reference_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

// =============================================================================
// In-transaction statements
// =============================================================================

/// Takes `quantity` units from one stock entry, only if that many remain.
///
/// ## Errors
/// [`DbError::StockConflict`] when the row holds less than `quantity`
/// (or does not exist). The caller must roll back.
pub(crate) async fn decrement(
    conn: &mut SqliteConnection,
    variant_id: &str,
    location_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE stock_entries
        SET quantity = quantity - ?3, updated_at = ?4
        WHERE variant_id = ?1 AND location_id = ?2 AND quantity >= ?3
        "#,
    )
    .bind(variant_id)
    .bind(location_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::StockConflict {
            variant_id: variant_id.to_string(),
            location_id: location_id.to_string(),
            requested: quantity,
        });
    }

    debug!(variant_id = %variant_id, location_id = %location_id, quantity, "Stock decremented");
    Ok(())
}

/// Appends a row to the movement ledger.
pub(crate) async fn record_movement(
    conn: &mut SqliteConnection,
    variant_id: &str,
    location_id: &str,
    kind: MovementKind,
    quantity_delta: i64,
    reference_id: Option<&str>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, variant_id, location_id, kind, quantity_delta, reference_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(variant_id)
    .bind(location_id)
    .bind(kind)
    .bind(quantity_delta)
    .bind(reference_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;

    #[tokio::test]
    async fn test_stock_levels_sorted_by_lead_time() {
        let db = seeded_db().await;

        let levels = db.inventory().stock_levels(RING).await.unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0], StockLevel::new(LOCAL, "LOCAL", 0, 5));
        assert_eq!(levels[1], StockLevel::new(CHINA, "CN", 14, 10));

        assert_eq!(db.inventory().total_available(RING).await.unwrap(), 15);
        assert_eq!(db.inventory().total_available("NOPE").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_entries_hidden_from_levels() {
        let db = seeded_db().await;

        let mut conn = db.pool().acquire().await.unwrap();
        decrement(&mut conn, RING, LOCAL, 5).await.unwrap();
        drop(conn);

        let levels = db.inventory().stock_levels(RING).await.unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].location_id, CHINA);
    }

    #[tokio::test]
    async fn test_restock_accumulates_and_records_movement() {
        let db = seeded_db().await;

        let quantity = db.inventory().restock(RING, LOCAL, 3).await.unwrap();
        assert_eq!(quantity, 8);

        let movements = db.inventory().movements(RING).await.unwrap();
        assert_eq!(movements.len(), 3);
        assert!(movements.iter().all(|m| m.kind == MovementKind::Restock));
        assert_eq!(movements.last().unwrap().quantity_delta, 3);
    }

    #[tokio::test]
    async fn test_restock_rejects_non_positive() {
        let db = seeded_db().await;

        assert!(matches!(
            db.inventory().restock(RING, LOCAL, 0).await,
            Err(DbError::InvalidValue(_))
        ));
        assert_eq!(db.inventory().quantity_at(RING, LOCAL).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_decrement_never_goes_negative() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = decrement(&mut conn, RING, LOCAL, 6).await.unwrap_err();
        assert!(matches!(err, DbError::StockConflict { requested: 6, .. }));

        decrement(&mut conn, RING, LOCAL, 5).await.unwrap();
        drop(conn);

        assert_eq!(db.inventory().quantity_at(RING, LOCAL).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_decrement_missing_entry_is_conflict() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = decrement(&mut conn, RING, "LOC-NOWHERE", 1).await.unwrap_err();
        assert!(err.is_conflict());
    }
}
