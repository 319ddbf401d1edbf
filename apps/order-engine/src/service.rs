//! # Order Service
//!
//! Places orders: `Validating → Allocating → Committing → Committed | Failed`.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       OrderService::place_order                         │
//! │                                                                         │
//! │  Validating   request.validate()           ── ValidationError           │
//! │      │        variants, seller exist        ── NotFound                 │
//! │      │        commission config snapshot                                │
//! │      ▼                                                                  │
//! │  Allocating   lock variants (sorted)                                    │
//! │      │        read stock levels once                                    │
//! │      │        plan every line               ── InsufficientStock        │
//! │      │        commission per line, delivery date                        │
//! │      ▼                                                                  │
//! │  Committing   spawned task owns locks + draft                           │
//! │      │        OrderRepository::commit       ── ConcurrencyConflict      │
//! │      │                                         Timeout / Persistence    │
//! │      ▼                                                                  │
//! │  Committed    OrderReceipt                                              │
//! │                                                                         │
//! │  Nothing is written before Committing; Committing is all or nothing.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The commit runs on its own task. If the caller's future is dropped
//! mid-request, the task still commits or rolls back, and only then
//! releases the variant locks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use cocolu_core::allocation::order_lead_time;
use cocolu_core::commission::{calculate_order_commission, CommissionLine};
use cocolu_core::delivery::{estimate_delivery_date, estimate_delivery_date_with, BusinessCalendar, WeekdayCalendar};
use cocolu_core::{AllocationPlan, CommissionRate, InventorySnapshot, Money, Variant};
use cocolu_db::{Database, LineDraft, ManufacturerChoice, OrderDraft};

use crate::config::EngineConfig;
use crate::error::{OrderError, OrderResult};
use crate::locks::VariantLocks;
use crate::receipt::OrderReceipt;
use crate::report::{ManufacturerEarningsRow, SellerCommissionRow};
use crate::request::PlaceOrderRequest;

/// The order orchestrator. Cheap to clone; clones share locks and pool.
#[derive(Clone)]
pub struct OrderService {
    db: Database,
    locks: VariantLocks,
    config: EngineConfig,
    calendar: Option<Arc<dyn BusinessCalendar>>,
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("config", &self.config)
            .field("calendar", &self.calendar.is_some())
            .finish_non_exhaustive()
    }
}

impl OrderService {
    /// Creates a service over `db`. Business-day delivery uses
    /// [`WeekdayCalendar`] unless another calendar is set.
    pub fn new(db: Database, config: EngineConfig) -> Self {
        let calendar: Option<Arc<dyn BusinessCalendar>> = if config.business_day_delivery {
            Some(Arc::new(WeekdayCalendar))
        } else {
            None
        };

        OrderService {
            db,
            locks: VariantLocks::new(),
            config,
            calendar,
        }
    }

    /// Replaces the business calendar (e.g. one that knows holidays).
    pub fn with_calendar(mut self, calendar: Arc<dyn BusinessCalendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn locks(&self) -> &VariantLocks {
        &self.locks
    }

    /// Places an order dated today (UTC).
    pub async fn place_order(&self, request: PlaceOrderRequest) -> OrderResult<OrderReceipt> {
        self.place_order_on(request, Utc::now().date_naive()).await
    }

    /// Places an order with `today` as the base of the delivery estimate.
    pub async fn place_order_on(&self, request: PlaceOrderRequest, today: NaiveDate) -> OrderResult<OrderReceipt> {
        let order_id = Uuid::new_v4().to_string();

        let result = self.run(&order_id, request, today).await;

        match &result {
            Ok(receipt) => info!(
                order_id = %order_id,
                delivery_date = %receipt.delivery_date_estimate,
                subtotal = %Money::from_cents(receipt.totals.subtotal_cents),
                commission = %Money::from_cents(receipt.totals.commission_cents),
                "Order placed"
            ),
            Err(e) => warn!(
                order_id = %order_id,
                error = %e,
                retryable = e.is_retryable(),
                "Order failed"
            ),
        }

        result
    }

    async fn run(&self, order_id: &str, request: PlaceOrderRequest, today: NaiveDate) -> OrderResult<OrderReceipt> {
        // ---------------------------------------------------------------------
        // Validating
        // ---------------------------------------------------------------------
        debug!(order_id = %order_id, lines = request.lines.len(), "Validating");
        request.validate()?;

        let mut variants: HashMap<String, Variant> = HashMap::new();
        for line in &request.lines {
            if variants.contains_key(&line.variant_id) {
                continue;
            }
            let variant = self
                .db
                .catalog()
                .get_variant(&line.variant_id)
                .await?
                .ok_or_else(|| OrderError::not_found("Variant", &line.variant_id))?;
            variants.insert(line.variant_id.clone(), variant);
        }

        let seller_rate = match &request.seller_id {
            Some(id) => self
                .db
                .sellers()
                .get_by_id(id)
                .await?
                .ok_or_else(|| OrderError::not_found("Seller", id))?
                .commission_rate(),
            None => CommissionRate::zero(),
        };

        let commission_config = self.db.config().commission_config().await?;

        // ---------------------------------------------------------------------
        // Allocating
        // ---------------------------------------------------------------------
        let guards = self
            .locks
            .acquire(request.lines.iter().map(|l| l.variant_id.as_str()))
            .await;
        debug!(order_id = %order_id, variants = ?guards.variant_ids(), "Allocating");

        let mut snapshot = InventorySnapshot::new();
        for variant_id in guards.variant_ids() {
            let levels = self.db.inventory().stock_levels(variant_id).await?;
            snapshot.insert(variant_id.clone(), levels);
        }

        let plans: Vec<AllocationPlan> = request
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                snapshot
                    .allocate(&line.variant_id, line.quantity)
                    .map_err(|e| OrderError::at_line(i, e))
            })
            .collect::<OrderResult<_>>()?;

        let commission_lines: Vec<CommissionLine> = request
            .lines
            .iter()
            .map(|line| {
                let variant = &variants[&line.variant_id];
                CommissionLine {
                    unit_price: line
                        .unit_price_cents
                        .map(Money::from_cents)
                        .unwrap_or_else(|| variant.sale_price()),
                    unit_cost: variant.unit_cost(),
                    quantity: line.quantity,
                }
            })
            .collect();
        let (line_commissions, _) = calculate_order_commission(&commission_lines, seller_rate, &commission_config);

        let max_lead_time_days = order_lead_time(&plans);
        let delivery_date = match &self.calendar {
            Some(calendar) => estimate_delivery_date_with(today, max_lead_time_days, calendar.as_ref()),
            None => estimate_delivery_date(today, max_lead_time_days),
        };

        let manufacturer = match &request.manufacturer_id {
            Some(id) => ManufacturerChoice::Explicit(id.clone()),
            None if self.config.auto_assign_manufacturer => ManufacturerChoice::AutoAssign,
            None => ManufacturerChoice::Unassigned,
        };

        let lines = request
            .lines
            .into_iter()
            .zip(plans)
            .zip(commission_lines.iter().zip(line_commissions))
            .map(|((line, plan), (amounts, commission))| LineDraft {
                line_id: Uuid::new_v4().to_string(),
                variant_id: line.variant_id,
                quantity: line.quantity,
                unit_price_cents: amounts.unit_price.cents(),
                unit_cost_cents: amounts.unit_cost.cents(),
                commission,
                lot_label: line.lot_label,
                plan,
            })
            .collect();

        let draft = OrderDraft {
            order_id: order_id.to_string(),
            customer_name: request.customer.name.trim().to_string(),
            customer_last_name: request.customer.last_name.trim().to_string(),
            customer_document: request.customer.document,
            customer_phone: request.customer.phone,
            seller_id: request.seller_id,
            manufacturer,
            max_lead_time_days,
            delivery_date,
            notes: request.notes,
            lines,
        };

        // ---------------------------------------------------------------------
        // Committing
        // ---------------------------------------------------------------------
        info!(
            order_id = %order_id,
            max_lead_time_days,
            mode = %commission_config.mode,
            "Committing"
        );

        let db = self.db.clone();
        let timeout = self.config.commit_timeout;
        let commit = tokio::spawn(async move {
            let _guards = guards;
            let order = db.orders().commit(&draft, timeout).await?;
            Ok::<_, OrderError>(OrderReceipt::from_draft(&order, &draft))
        });

        commit
            .await
            .map_err(|e| OrderError::Internal(format!("commit task failed: {e}")))?
    }

    /// Re-renders the receipt of a stored order.
    pub async fn render_receipt(&self, order_id: &str) -> OrderResult<OrderReceipt> {
        let orders = self.db.orders();
        let order = orders
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Order", order_id))?;

        let mut lines = Vec::new();
        for line in orders.get_lines(order_id).await? {
            let allocations = orders.get_allocations(&line.id).await?;
            lines.push((line, allocations));
        }

        Ok(OrderReceipt::from_stored(&order, lines))
    }

    /// Commission per active seller for orders created in `[from, to)`.
    pub async fn seller_report(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> OrderResult<Vec<SellerCommissionRow>> {
        check_range(from, to)?;

        let rows = self.db.sellers().commission_summary(from, to).await?;
        Ok(rows.iter().map(SellerCommissionRow::from).collect())
    }

    /// Piece-rate earnings per active manufacturer for orders created in
    /// `[from, to)`.
    pub async fn manufacturer_report(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> OrderResult<Vec<ManufacturerEarningsRow>> {
        check_range(from, to)?;

        let rows = self.db.manufacturers().earnings_summary(from, to).await?;
        Ok(rows.iter().map(ManufacturerEarningsRow::from).collect())
    }
}

fn check_range(from: DateTime<Utc>, to: DateTime<Utc>) -> OrderResult<()> {
    if from > to {
        return Err(OrderError::Validation(cocolu_core::ValidationError::InvalidFormat {
            field: "from".to_string(),
            reason: "must not be after 'to'".to_string(),
        }));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
