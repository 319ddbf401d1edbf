//! # Order Repository
//!
//! The atomic order commit and order read-back.
//!
//! ## Commit Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       OrderRepository::commit                           │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├── 1. for every line, for every take:                               │
//! │   │       conditional decrement (quantity >= take)  ──✗──► ROLLBACK    │
//! │   │                                                  StockConflict      │
//! │   ├── 2. manufacturer: explicit (+1 load) or least loaded (+1 load)    │
//! │   ├── 3. INSERT orders        (totals, delivery date)                  │
//! │   ├── 4. INSERT order_lines   (price/cost snapshot, lot label)         │
//! │   ├── 5. INSERT order_line_allocations                                 │
//! │   └── 6. INSERT stock_movements (kind = sale, −qty, order id)          │
//! │   │                                                                     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Steps 1-6 share one deadline. Any error or an expired deadline        │
//! │  rolls back every write; the caller sees the error and nothing else.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::time::Instant;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{inventory, manufacturer};
use cocolu_core::validation::validate_lot_label;
use cocolu_core::{
    AllocationPlan, FractionalMoney, LineAllocation, Money, MovementKind, Order, OrderLine, OrderStatus,
};

// =============================================================================
// Draft
// =============================================================================

/// Who builds the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManufacturerChoice {
    /// Leave unassigned.
    Unassigned,
    /// The caller picked one; it must exist.
    Explicit(String),
    /// Pick the active manufacturer with the lowest load.
    AutoAssign,
}

/// A fully planned order line, ready to persist.
#[derive(Debug, Clone)]
pub struct LineDraft {
    pub line_id: String,
    pub variant_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub commission: FractionalMoney,
    pub lot_label: Option<String>,
    pub plan: AllocationPlan,
}

/// A fully planned order: every line allocated, every amount computed.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_id: String,
    pub customer_name: String,
    pub customer_last_name: String,
    pub customer_document: Option<String>,
    pub customer_phone: Option<String>,
    pub seller_id: Option<String>,
    pub manufacturer: ManufacturerChoice,
    pub max_lead_time_days: i64,
    pub delivery_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<LineDraft>,
}

impl OrderDraft {
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .map(|l| Money::from_cents(l.unit_price_cents).multiply_quantity(l.quantity))
            .sum()
    }

    pub fn cost_total(&self) -> Money {
        self.lines
            .iter()
            .map(|l| Money::from_cents(l.unit_cost_cents).multiply_quantity(l.quantity))
            .sum()
    }

    pub fn commission_total(&self) -> FractionalMoney {
        self.lines.iter().map(|l| l.commission).sum()
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists a draft atomically: all writes or none.
    ///
    /// ## Errors
    /// - [`DbError::InvalidValue`] for a lot label that fails validation
    ///   (checked before the transaction opens)
    /// - [`DbError::StockConflict`] if any take no longer fits the stored
    ///   quantity
    /// - [`DbError::NotFound`] for an unknown explicit manufacturer
    /// - [`DbError::Timeout`] if acquiring a connection plus the writes
    ///   outlast `timeout`
    /// - [`DbError::Busy`] if SQLite's write lock stays taken
    ///
    /// Every error path rolls back before returning.
    ///
    /// ## Deadline
    /// `timeout` covers `BEGIN` and every write. The final `COMMIT` is not
    /// cut short: once sent, abandoning it would leave the outcome unknown.
    /// It is bounded by the connection's `busy_timeout` instead.
    pub async fn commit(&self, draft: &OrderDraft, timeout: Duration) -> DbResult<Order> {
        for (i, line) in draft.lines.iter().enumerate() {
            if let Some(label) = &line.lot_label {
                validate_lot_label(label)
                    .map_err(|e| DbError::InvalidValue(e.at(&format!("lines[{i}]")).to_string()))?;
            }
        }

        debug!(order_id = %draft.order_id, lines = draft.lines.len(), "Opening commit transaction");

        let deadline = Instant::now() + timeout;

        let mut tx = match tokio::time::timeout_at(deadline, self.pool.begin()).await {
            Ok(tx) => tx?,
            Err(_) => {
                warn!(order_id = %draft.order_id, "No connection before the commit deadline");
                return Err(DbError::Timeout(timeout));
            }
        };
        let outcome = tokio::time::timeout_at(deadline, write_order(&mut *tx, draft)).await;

        match outcome {
            Ok(Ok(order)) => {
                tx.commit().await?;
                info!(
                    order_id = %order.id,
                    subtotal = %order.subtotal(),
                    delivery_date = %order.delivery_date,
                    "Order committed"
                );
                Ok(order)
            }
            Ok(Err(err)) => {
                rollback(tx, &draft.order_id).await;
                Err(err)
            }
            Err(_) => {
                rollback(tx, &draft.order_id).await;
                Err(DbError::Timeout(timeout))
            }
        }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id, customer_name, customer_last_name, customer_document, customer_phone,
                seller_id, manufacturer_id, status,
                subtotal_cents, cost_total_cents, commission_total_units,
                max_lead_time_days, delivery_date, notes, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lines of an order in request order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT
                id, order_id, line_no, variant_id, quantity,
                unit_price_cents, unit_cost_cents, commission_units,
                lot_label, max_lead_time_days, created_at
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Allocations of one line, fastest location first.
    pub async fn get_allocations(&self, line_id: &str) -> DbResult<Vec<LineAllocation>> {
        let allocations = sqlx::query_as::<_, LineAllocation>(
            r#"
            SELECT line_id, location_id, location_code, quantity, lead_time_days
            FROM order_line_allocations
            WHERE line_id = ?1
            ORDER BY lead_time_days, location_id
            "#,
        )
        .bind(line_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(allocations)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Transaction body
// =============================================================================

async fn write_order(conn: &mut SqliteConnection, draft: &OrderDraft) -> DbResult<Order> {
    let now = Utc::now();

    for line in &draft.lines {
        for take in &line.plan.takes {
            inventory::decrement(conn, &line.variant_id, &take.location_id, take.quantity).await?;
        }
    }

    let manufacturer_id = match &draft.manufacturer {
        ManufacturerChoice::Unassigned => None,
        ManufacturerChoice::Explicit(id) => {
            manufacturer::add_load(conn, id).await?;
            Some(id.clone())
        }
        ManufacturerChoice::AutoAssign => match manufacturer::least_loaded(conn).await? {
            Some(id) => {
                manufacturer::add_load(conn, &id).await?;
                debug!(order_id = %draft.order_id, manufacturer_id = %id, "Manufacturer auto-assigned");
                Some(id)
            }
            None => {
                warn!(order_id = %draft.order_id, "No active manufacturer, order left unassigned");
                None
            }
        },
    };

    let order = Order {
        id: draft.order_id.clone(),
        customer_name: draft.customer_name.clone(),
        customer_last_name: draft.customer_last_name.clone(),
        customer_document: draft.customer_document.clone(),
        customer_phone: draft.customer_phone.clone(),
        seller_id: draft.seller_id.clone(),
        manufacturer_id,
        status: OrderStatus::Pending,
        subtotal_cents: draft.subtotal().cents(),
        cost_total_cents: draft.cost_total().cents(),
        commission_total_units: draft.commission_total().units(),
        max_lead_time_days: draft.max_lead_time_days,
        delivery_date: draft.delivery_date,
        notes: draft.notes.clone(),
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, customer_name, customer_last_name, customer_document, customer_phone,
            seller_id, manufacturer_id, status,
            subtotal_cents, cost_total_cents, commission_total_units,
            max_lead_time_days, delivery_date, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_name)
    .bind(&order.customer_last_name)
    .bind(&order.customer_document)
    .bind(&order.customer_phone)
    .bind(&order.seller_id)
    .bind(&order.manufacturer_id)
    .bind(order.status)
    .bind(order.subtotal_cents)
    .bind(order.cost_total_cents)
    .bind(order.commission_total_units)
    .bind(order.max_lead_time_days)
    .bind(order.delivery_date)
    .bind(&order.notes)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await?;

    for (line_no, line) in draft.lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_lines (
                id, order_id, line_no, variant_id, quantity,
                unit_price_cents, unit_cost_cents, commission_units,
                lot_label, max_lead_time_days, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&line.line_id)
        .bind(&order.id)
        .bind(line_no as i64)
        .bind(&line.variant_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.unit_cost_cents)
        .bind(line.commission.units())
        .bind(&line.lot_label)
        .bind(line.plan.max_lead_time_days)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        for take in &line.plan.takes {
            sqlx::query(
                r#"
                INSERT INTO order_line_allocations (
                    line_id, location_id, location_code, quantity, lead_time_days
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&line.line_id)
            .bind(&take.location_id)
            .bind(&take.location_code)
            .bind(take.quantity)
            .bind(take.lead_time_days)
            .execute(&mut *conn)
            .await?;

            inventory::record_movement(
                conn,
                &line.variant_id,
                &take.location_id,
                MovementKind::Sale,
                -take.quantity,
                Some(&order.id),
            )
            .await?;
        }
    }

    Ok(order)
}

async fn rollback(tx: Transaction<'_, Sqlite>, order_id: &str) {
    match tx.rollback().await {
        Ok(()) => debug!(order_id = %order_id, "Commit rolled back"),
        Err(e) => warn!(order_id = %order_id, error = %e, "Rollback failed; connection discards the transaction"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
