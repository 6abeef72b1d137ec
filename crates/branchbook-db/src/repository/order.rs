//! # Order Repository
//!
//! The order lifecycle: create, update while pending, and record deliveries.
//!
//! ## Side Effects of One Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order 0314K2Q9: 2 items, total 100.00, received 40.00 into cash        │
//! │                                                                         │
//! │  TopSheet(branch, order_date)     order_count += 2, cash += 40          │
//! │  Ledger                           customer ──40──► account              │
//! │                                   (Advance Payment, ORDER-0314K2Q9)     │
//! │  order_transactions               Advance Payment row, 40               │
//! │  Account.current_balance          += 40                                 │
//! │  Customer.due_amount              += 60                                 │
//! │  Progress(salesperson, date)      order_count += 2, sale_amount += 100  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With no advance the order names no account and neither the ledger nor
//! any balance moves; with nothing due the customer row is left alone.
//!
//! ## Update = Reverse Old, Apply New
//! An update runs [`reverse_side_effects`] with the stored order's
//! footprint and then [`apply_side_effects`] with the new one. Date,
//! salesperson, customer and account may all change, and each keys a
//! different aggregate row, so the effect has to move rather than be netted.
//!
//! ## Delivery
//! ```text
//! pending/partial ──deliver(qty, amount)──► partial | delivered
//!
//!   TopSheet(delivery date)   delivery += qty, cash|bank += amount
//!   order_transactions        Payment row (qty, amount, delivered_by)
//!   amount > 0:               ledger customer ──amount──► account,
//!                             balance += amount, due -= amount
//! ```

use branchbook_core::memo::{self, LedgerTag};
use branchbook_core::validation::{validate_branch_id, validate_id, validate_new_order};
use branchbook_core::{
    DeliveryPlan, EntityRef, LineItem, Money, NewLedgerEntry, NewOrder, Order, OrderDelivery,
    OrderStatus, OrderTransaction, Page, PageRequest, ProgressDelta, TopSheetDelta,
    TradeFootprint, TransactionType,
};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument, warn};

use crate::error::{DbError, DbResult};
use crate::repository::account::{adjust_balance, lock_receiving_account, receiving_type};
use crate::repository::branch::lock_branch;
use crate::repository::customer::{adjust_due, lock_customer};
use crate::repository::ledger;
use crate::repository::progress::apply_progress_delta;
use crate::repository::top_sheet::apply_top_sheet_delta;
use crate::repository::Created;

const SELECT_ORDER: &str = r#"
    SELECT id, branch_id, memo_no, order_date, delivery_date,
           salesperson_id, customer_id, total_items, delivered_items,
           total_amount, COALESCE(payment_account_id, 0) AS payment_account_id,
           received_amount, status, notes
    FROM orders
"#;

// =============================================================================
// Side Effects
// =============================================================================

/// Applies every aggregate effect of the order described by `fp`.
async fn apply_side_effects(
    conn: &mut SqliteConnection,
    order_id: i64,
    fp: &TradeFootprint,
) -> DbResult<()> {
    let account = lock_receiving_account(conn, fp.branch_id, fp.payment_account_id, fp.received_amount).await?;

    apply_top_sheet_delta(
        conn,
        fp.branch_id,
        fp.date,
        &TopSheetDelta::order_placed(fp.total_items, fp.received_amount, receiving_type(account.as_ref())),
    )
    .await?;

    if let Some(account) = &account {
        insert_order_transaction(
            conn,
            order_id,
            &fp.memo_no,
            &OrderDelivery {
                transaction_date: fp.date,
                delivered_by: fp.salesperson_id,
                quantity_delivered: 0,
                amount: fp.received_amount,
                payment_account_id: account.id,
            },
            TransactionType::AdvancePayment,
        )
        .await?;

        ledger::append(
            conn,
            &NewLedgerEntry {
                transaction_date: fp.date,
                memo_no: Some(LedgerTag::Order.memo(&fp.memo_no)),
                branch_id: fp.branch_id,
                from: EntityRef::Customer(fp.customer_id),
                to: EntityRef::Account(account.id),
                amount: fp.received_amount,
                transaction_type: TransactionType::AdvancePayment,
                notes: Some("Advance payment from customer".to_string()),
            },
        )
        .await?;
        adjust_balance(conn, account.id, fp.received_amount).await?;
    }

    if !fp.due().is_zero() {
        lock_customer(conn, fp.branch_id, fp.customer_id).await?;
        adjust_due(conn, fp.customer_id, fp.due()).await?;
    }

    apply_progress_delta(
        conn,
        fp.branch_id,
        fp.salesperson_id,
        fp.date,
        &ProgressDelta::order_booked(fp),
    )
    .await?;

    debug!(order_id, memo_no = %fp.memo_no, "Order side effects applied");
    Ok(())
}

/// Exact inverse of [`apply_side_effects`] for the same footprint.
async fn reverse_side_effects(
    conn: &mut SqliteConnection,
    order_id: i64,
    fp: &TradeFootprint,
) -> DbResult<()> {
    let account = lock_receiving_account(conn, fp.branch_id, fp.payment_account_id, fp.received_amount).await?;

    apply_top_sheet_delta(
        conn,
        fp.branch_id,
        fp.date,
        &-TopSheetDelta::order_placed(fp.total_items, fp.received_amount, receiving_type(account.as_ref())),
    )
    .await?;

    if let Some(account) = &account {
        sqlx::query("DELETE FROM order_transactions WHERE order_id = ? AND transaction_type = ?")
            .bind(order_id)
            .bind(TransactionType::AdvancePayment)
            .execute(&mut *conn)
            .await?;

        ledger::delete_by_memo(
            conn,
            fp.branch_id,
            &LedgerTag::Order.memo(&fp.memo_no),
            TransactionType::AdvancePayment,
        )
        .await?;
        adjust_balance(conn, account.id, -fp.received_amount).await?;
    }

    if !fp.due().is_zero() {
        lock_customer(conn, fp.branch_id, fp.customer_id).await?;
        adjust_due(conn, fp.customer_id, -fp.due()).await?;
    }

    apply_progress_delta(
        conn,
        fp.branch_id,
        fp.salesperson_id,
        fp.date,
        &-ProgressDelta::order_booked(fp),
    )
    .await?;

    debug!(order_id, memo_no = %fp.memo_no, "Order side effects reversed");
    Ok(())
}

// =============================================================================
// Row Helpers
// =============================================================================

async fn fetch_order(conn: &mut SqliteConnection, branch_id: i64, order_id: i64) -> DbResult<Order> {
    sqlx::query_as::<_, Order>(&format!("{SELECT_ORDER} WHERE id = ? AND branch_id = ?"))
        .bind(order_id)
        .bind(branch_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_id))
}

async fn insert_items(conn: &mut SqliteConnection, order_id: i64, items: &[LineItem]) -> DbResult<()> {
    for item in items {
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, subtotal) VALUES (?, ?, ?, ?)")
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.subtotal)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_order_transaction(
    conn: &mut SqliteConnection,
    order_id: i64,
    memo_no: &str,
    event: &OrderDelivery,
    transaction_type: TransactionType,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_transactions (
            order_id, transaction_date, memo_no, payment_account_id,
            delivered_by, quantity_delivered, amount, transaction_type
        ) VALUES (?, ?, ?, NULLIF(?, 0), ?, ?, ?, ?)
        "#,
    )
    .bind(order_id)
    .bind(event.transaction_date)
    .bind(memo_no)
    .bind(event.payment_account_id)
    .bind(event.delivered_by)
    .bind(event.quantity_delivered)
    .bind(event.amount)
    .bind(transaction_type)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =============================================================================
// Read Models
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub subtotal: Money,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderTransactionLine {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transaction: OrderTransaction,
    pub account_name: String,
}

/// An order with its items, payments and party names.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_mobile: String,
    pub salesperson_name: String,
    pub due_amount: Money,
    pub items: Vec<OrderItemLine>,
    pub transactions: Vec<OrderTransactionLine>,
}

/// One row of the order list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: i64,
    pub memo_no: String,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub customer_name: String,
    pub customer_mobile: String,
    pub salesperson_name: String,
    pub total_items: i64,
    pub delivered_items: i64,
    pub total_amount: Money,
    pub received_amount: Money,
    pub due_amount: Money,
    pub status: OrderStatus,
}

/// Filter for [`OrderRepository::list`]. `status: None` lists every status.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub page: PageRequest,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the order aggregate.
///
/// ## Usage
/// ```rust,ignore
/// let created = db.orders().create(branch_id, &new_order).await?;
/// db.orders().record_delivery(branch_id, created.id, &delivery).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order and all of its side effects in one transaction.
    ///
    /// ## Errors
    /// - Validation (no items, received outside `0..=total`): nothing written
    /// - `DuplicateMemo` when the memo exists in the branch: nothing written
    /// - NotFound for an account or customer outside the branch
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create(&self, branch_id: i64, order: &NewOrder) -> DbResult<Created> {
        validate_branch_id(branch_id)?;
        if let Err(e) = validate_new_order(order) {
            warn!(error = %e, "Rejected order");
            return Err(e.into());
        }
        let memo_no = memo::resolve(order.memo_no.as_deref(), order.order_date)?;
        let fp = order.footprint(branch_id, &memo_no);

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                branch_id, memo_no, order_date, delivery_date,
                salesperson_id, customer_id, total_items, delivered_items,
                total_amount, payment_account_id, received_amount, status, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, NULLIF(?, 0), ?, ?, ?)
            "#,
        )
        .bind(branch_id)
        .bind(&memo_no)
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(order.salesperson_id)
        .bind(order.customer_id)
        .bind(fp.total_items)
        .bind(order.total_amount)
        .bind(order.payment_account_id)
        .bind(order.received_amount)
        .bind(OrderStatus::Pending)
        .bind(&order.notes)
        .execute(&mut *tx)
        .await?;
        let order_id = result.last_insert_rowid();

        insert_items(&mut tx, order_id, &order.items).await?;
        apply_side_effects(&mut tx, order_id, &fp).await?;

        tx.commit().await?;

        info!(order_id, memo_no = %memo_no, total = %order.total_amount, "Order created");
        Ok(Created {
            id: order_id,
            memo_no,
        })
    }

    /// Replaces a pending order, moving every side effect from the stored
    /// values to the new ones. A missing memo keeps the stored memo.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn update(&self, branch_id: i64, order_id: i64, order: &NewOrder) -> DbResult<()> {
        validate_branch_id(branch_id)?;
        if let Err(e) = validate_new_order(order) {
            warn!(error = %e, "Rejected order update");
            return Err(e.into());
        }

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let old = fetch_order(&mut tx, branch_id, order_id).await?;
        old.ensure_editable()?;

        let memo_no = match order.memo_no.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => memo::resolve(Some(m), order.order_date)?,
            _ => old.memo_no.clone(),
        };
        let fp = order.footprint(branch_id, &memo_no);

        reverse_side_effects(&mut tx, old.id, &old.footprint()).await?;

        sqlx::query(
            r#"
            UPDATE orders SET
                memo_no = ?, order_date = ?, delivery_date = ?,
                salesperson_id = ?, customer_id = ?, total_items = ?,
                total_amount = ?, payment_account_id = NULLIF(?, 0), received_amount = ?,
                notes = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(&memo_no)
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(order.salesperson_id)
        .bind(order.customer_id)
        .bind(fp.total_items)
        .bind(order.total_amount)
        .bind(order.payment_account_id)
        .bind(order.received_amount)
        .bind(&order.notes)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, order_id, &order.items).await?;

        apply_side_effects(&mut tx, order_id, &fp).await?;

        tx.commit().await?;

        info!(order_id, memo_no = %memo_no, "Order updated");
        Ok(())
    }

    /// Records a delivery and/or payment against an open order.
    ///
    /// ## Returns
    /// The header values after the delivery, including the new status.
    #[instrument(skip(self, delivery))]
    pub async fn record_delivery(
        &self,
        branch_id: i64,
        order_id: i64,
        delivery: &OrderDelivery,
    ) -> DbResult<DeliveryPlan> {
        validate_branch_id(branch_id)?;
        validate_id("delivered_by", delivery.delivered_by)?;
        if delivery.amount.is_positive() {
            validate_id("payment_account_id", delivery.payment_account_id)?;
        }

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let order = fetch_order(&mut tx, branch_id, order_id).await?;
        let plan = match order.plan_delivery(delivery) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, memo_no = %order.memo_no, "Rejected delivery");
                return Err(e.into());
            }
        };

        let account =
            lock_receiving_account(&mut tx, branch_id, delivery.payment_account_id, delivery.amount)
                .await?;

        apply_top_sheet_delta(
            &mut tx,
            branch_id,
            delivery.transaction_date,
            &TopSheetDelta::delivery(
                delivery.quantity_delivered,
                delivery.amount,
                receiving_type(account.as_ref()),
            ),
        )
        .await?;

        insert_order_transaction(
            &mut tx,
            order_id,
            &order.memo_no,
            delivery,
            TransactionType::Payment,
        )
        .await?;

        if let Some(account) = &account {
            ledger::append(
                &mut tx,
                &NewLedgerEntry {
                    transaction_date: delivery.transaction_date,
                    memo_no: Some(LedgerTag::Order.memo(&order.memo_no)),
                    branch_id,
                    from: EntityRef::Customer(order.customer_id),
                    to: EntityRef::Account(account.id),
                    amount: delivery.amount,
                    transaction_type: TransactionType::Payment,
                    notes: Some("Payment received upon delivery".to_string()),
                },
            )
            .await?;
            adjust_balance(&mut tx, account.id, delivery.amount).await?;

            lock_customer(&mut tx, branch_id, order.customer_id).await?;
            adjust_due(&mut tx, order.customer_id, -delivery.amount).await?;
        }

        sqlx::query(
            r#"
            UPDATE orders SET
                received_amount = ?, delivered_items = ?, status = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(plan.received_amount)
        .bind(plan.delivered_items)
        .bind(plan.status)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            order_id,
            memo_no = %order.memo_no,
            status = %plan.status,
            "Delivery recorded"
        );
        Ok(plan)
    }

    pub async fn get(&self, branch_id: i64, order_id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDER} WHERE id = ? AND branch_id = ?"))
            .bind(order_id)
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Order header with items (product names), transactions (account
    /// names) and party names.
    pub async fn get_details(&self, branch_id: i64, order_id: i64) -> DbResult<OrderDetails> {
        let order = self
            .get(branch_id, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let (customer_name, customer_mobile, salesperson_name): (String, String, String) =
            sqlx::query_as(
                r#"
                SELECT c.name, c.mobile, e.name
                FROM customers c, employees e
                WHERE c.id = ? AND e.id = ?
                "#,
            )
            .bind(order.customer_id)
            .bind(order.salesperson_id)
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, OrderItemLine>(
            r#"
            SELECT i.product_id, p.product_name, i.quantity, i.subtotal
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = ?
            ORDER BY i.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let transactions = sqlx::query_as::<_, OrderTransactionLine>(
            r#"
            SELECT t.transaction_id, t.order_id, t.transaction_date, t.memo_no,
                   COALESCE(t.payment_account_id, 0) AS payment_account_id,
                   t.delivered_by, t.quantity_delivered, t.amount, t.transaction_type,
                   COALESCE(a.name, '') AS account_name
            FROM order_transactions t
            LEFT JOIN accounts a ON a.id = t.payment_account_id
            WHERE t.order_id = ?
            ORDER BY t.transaction_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderDetails {
            due_amount: order.due(),
            order,
            customer_name,
            customer_mobile,
            salesperson_name,
            items,
            transactions,
        })
    }

    /// Lists orders newest first. Search matches memo, customer name or
    /// customer mobile.
    pub async fn list(&self, branch_id: i64, query: &OrderQuery) -> DbResult<Page<OrderSummary>> {
        let pattern = query.search.as_ref().map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, o.memo_no, o.order_date, o.delivery_date,
                   c.name AS customer_name, c.mobile AS customer_mobile,
                   e.name AS salesperson_name,
                   o.total_items, o.delivered_items, o.total_amount, o.received_amount,
                   o.total_amount - o.received_amount AS due_amount,
                   o.status
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            JOIN employees e ON e.id = o.salesperson_id
            WHERE o.branch_id = ?1
              AND (?2 IS NULL OR o.status = ?2)
              AND (?3 IS NULL OR o.memo_no LIKE ?3 OR c.name LIKE ?3 OR c.mobile LIKE ?3)
            ORDER BY o.order_date DESC, o.id DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(branch_id)
        .bind(query.status)
        .bind(&pattern)
        .bind(query.page.limit)
        .bind(query.page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.branch_id = ?1
              AND (?2 IS NULL OR o.status = ?2)
              AND (?3 IS NULL OR o.memo_no LIKE ?3 OR c.name LIKE ?3 OR c.mobile LIKE ?3)
            "#,
        )
        .bind(branch_id)
        .bind(query.status)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { rows, total_count })
    }
}

// =============================================================================
// Tests
// =============================================================================
