//! # Seller Repository
//!
//! Seller directory (read by the engine for the commission rate) and the
//! per-seller commission report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use cocolu_core::{FractionalMoney, Money, Seller};

/// One row of the seller commission report.
///
/// Amounts are exact; round with [`FractionalMoney::round_to_cents`] when
/// presenting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SellerCommissionSummary {
    pub seller_id: String,
    pub seller_name: String,
    pub order_count: i64,
    pub total_sales_cents: i64,
    pub commission_total_units: i64,
}

impl SellerCommissionSummary {
    pub fn total_sales(&self) -> Money {
        Money::from_cents(self.total_sales_cents)
    }

    pub fn commission_total(&self) -> FractionalMoney {
        FractionalMoney::from_units(self.commission_total_units)
    }
}

/// Repository for seller database operations.
#[derive(Debug, Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    /// Creates a new SellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SellerRepository { pool }
    }

    /// Gets a seller by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Seller>> {
        let seller = sqlx::query_as::<_, Seller>(
            "SELECT id, name, email, commission_rate_bps, active FROM sellers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(seller)
    }

    pub async fn insert(&self, seller: &Seller) -> DbResult<()> {
        debug!(id = %seller.id, rate_bps = seller.commission_rate_bps, "Inserting seller");

        sqlx::query(
            r#"
            INSERT INTO sellers (id, name, email, commission_rate_bps, active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&seller.id)
        .bind(&seller.name)
        .bind(&seller.email)
        .bind(seller.commission_rate_bps)
        .bind(seller.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Changes a seller's commission rate. Affects orders placed afterwards.
    pub async fn set_commission_rate(&self, id: &str, rate_bps: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE sellers SET commission_rate_bps = ?2 WHERE id = ?1")
            .bind(id)
            .bind(rate_bps)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Seller", id));
        }

        Ok(())
    }

    pub async fn list_active(&self) -> DbResult<Vec<Seller>> {
        let sellers = sqlx::query_as::<_, Seller>(
            "SELECT id, name, email, commission_rate_bps, active FROM sellers WHERE active = 1 ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sellers)
    }

    /// Orders, sales and commission per active seller in `[from, to)`.
    ///
    /// Sellers without orders in the range appear with zeros. Sorted by
    /// commission, highest first.
    pub async fn commission_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<SellerCommissionSummary>> {
        let rows = sqlx::query_as::<_, SellerCommissionSummary>(
            r#"
            SELECT
                s.id AS seller_id,
                s.name AS seller_name,
                COUNT(o.id) AS order_count,
                COALESCE(SUM(o.subtotal_cents), 0) AS total_sales_cents,
                COALESCE(SUM(o.commission_total_units), 0) AS commission_total_units
            FROM sellers s
            LEFT JOIN orders o
                ON o.seller_id = s.id
               AND o.status != 'cancelled'
               AND o.created_at >= ?1
               AND o.created_at < ?2
            WHERE s.active = 1
            GROUP BY s.id, s.name
            ORDER BY commission_total_units DESC, s.id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_get_seller() {
        let db = seeded_db().await;

        let seller = db.sellers().get_by_id(SELLER).await.unwrap().unwrap();
        assert_eq!(seller.commission_rate().bps(), 1000);
        assert!(seller.active);

        assert!(db.sellers().get_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_commission_rate() {
        let db = seeded_db().await;

        db.sellers().set_commission_rate(SELLER, 750).await.unwrap();
        let seller = db.sellers().get_by_id(SELLER).await.unwrap().unwrap();
        assert_eq!(seller.commission_rate_bps, 750);
    }

    #[tokio::test]
    async fn test_summary_without_orders_lists_zeros() {
        let db = seeded_db().await;
        let now = Utc::now();

        let rows = db
            .sellers()
            .commission_summary(now - Duration::days(1), now + Duration::days(1))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].seller_id, SELLER);
        assert_eq!(rows[0].order_count, 0);
        assert_eq!(rows[0].commission_total(), FractionalMoney::zero());
    }
}
