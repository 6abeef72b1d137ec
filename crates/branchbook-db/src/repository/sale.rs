//! # Sale Repository
//!
//! Ready-made sales: goods leave stock the moment the sale is recorded.
//!
//! ## Sale vs Order
//! ```text
//! ┌───────────────────────────┬──────────────────────┬──────────────────────┐
//! │                           │ Order                │ Sale                 │
//! ├───────────────────────────┼──────────────────────┼──────────────────────┤
//! │ TopSheet                  │ order_count, cash    │ ready_made,          │
//! │                           │                      │ sales_amount, cash   │
//! │ Stock                     │ untouched            │ -= qty per item      │
//! │ Progress(salesperson)     │ order_count + amount │ sale_amount only     │
//! │ Ledger type               │ Advance Payment      │ Payment              │
//! │ Status                    │ pending → ...        │ delivered            │
//! └───────────────────────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! ## Update
//! Stock is restored for every *old* item, then deducted for every *new*
//! item: two full passes, never a netted per-product delta, because the
//! two item sets may not contain the same products. Money-side effects
//! are reverted with the stored footprint and re-applied with the new one.

use branchbook_core::memo::{self, LedgerTag};
use branchbook_core::validation::{validate_branch_id, validate_new_sale};
use branchbook_core::{
    EntityRef, LineItem, Money, NewLedgerEntry, NewSale, Page, PageRequest, ProgressDelta, Sale,
    SaleStatus, SaleTransaction, TopSheetDelta, TradeFootprint, TransactionType,
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
use crate::repository::product::adjust_stock;
use crate::repository::progress::apply_progress_delta;
use crate::repository::top_sheet::apply_top_sheet_delta;
use crate::repository::Created;

const SELECT_SALE: &str = r#"
    SELECT id, branch_id, memo_no, sale_date, salesperson_id, customer_id,
           total_items, total_amount, COALESCE(payment_account_id, 0) AS payment_account_id,
           received_amount, status, notes
    FROM sales
"#;

// =============================================================================
// Side Effects
// =============================================================================

async fn apply_side_effects(
    conn: &mut SqliteConnection,
    sale_id: i64,
    fp: &TradeFootprint,
) -> DbResult<()> {
    let account = lock_receiving_account(conn, fp.branch_id, fp.payment_account_id, fp.received_amount).await?;

    apply_top_sheet_delta(
        conn,
        fp.branch_id,
        fp.date,
        &TopSheetDelta::sale_made(fp, receiving_type(account.as_ref())),
    )
    .await?;

    if let Some(account) = &account {
        sqlx::query(
            r#"
            INSERT INTO sale_transactions (
                sale_id, transaction_date, memo_no, payment_account_id, amount, transaction_type
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sale_id)
        .bind(fp.date)
        .bind(&fp.memo_no)
        .bind(account.id)
        .bind(fp.received_amount)
        .bind(TransactionType::Payment)
        .execute(&mut *conn)
        .await?;

        ledger::append(
            conn,
            &NewLedgerEntry {
                transaction_date: fp.date,
                memo_no: Some(LedgerTag::Sale.memo(&fp.memo_no)),
                branch_id: fp.branch_id,
                from: EntityRef::Customer(fp.customer_id),
                to: EntityRef::Account(account.id),
                amount: fp.received_amount,
                transaction_type: TransactionType::Payment,
                notes: Some("Received payment on sale".to_string()),
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
        &ProgressDelta::sale_made(fp),
    )
    .await?;

    debug!(sale_id, memo_no = %fp.memo_no, "Sale side effects applied");
    Ok(())
}

async fn reverse_side_effects(
    conn: &mut SqliteConnection,
    sale_id: i64,
    fp: &TradeFootprint,
) -> DbResult<()> {
    let account = lock_receiving_account(conn, fp.branch_id, fp.payment_account_id, fp.received_amount).await?;

    apply_top_sheet_delta(
        conn,
        fp.branch_id,
        fp.date,
        &-TopSheetDelta::sale_made(fp, receiving_type(account.as_ref())),
    )
    .await?;

    if let Some(account) = &account {
        sqlx::query("DELETE FROM sale_transactions WHERE sale_id = ?")
            .bind(sale_id)
            .execute(&mut *conn)
            .await?;

        ledger::delete_by_memo(
            conn,
            fp.branch_id,
            &LedgerTag::Sale.memo(&fp.memo_no),
            TransactionType::Payment,
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
        &-ProgressDelta::sale_made(fp),
    )
    .await?;

    debug!(sale_id, memo_no = %fp.memo_no, "Sale side effects reversed");
    Ok(())
}

/// Moves stock by `sign * quantity` for every item.
async fn move_stock(
    conn: &mut SqliteConnection,
    branch_id: i64,
    items: &[LineItem],
    sign: i64,
) -> DbResult<()> {
    for item in items {
        adjust_stock(conn, branch_id, item.product_id, sign * item.quantity).await?;
    }
    Ok(())
}

async fn insert_items(conn: &mut SqliteConnection, sale_id: i64, items: &[LineItem]) -> DbResult<()> {
    for item in items {
        sqlx::query("INSERT INTO sale_items (sale_id, product_id, quantity, subtotal) VALUES (?, ?, ?, ?)")
            .bind(sale_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.subtotal)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn fetch_items(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<Vec<LineItem>> {
    let rows: Vec<(i64, i64, Money)> = sqlx::query_as(
        "SELECT product_id, quantity, subtotal FROM sale_items WHERE sale_id = ? ORDER BY id",
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(product_id, quantity, subtotal)| LineItem {
            product_id,
            quantity,
            subtotal,
        })
        .collect())
}

// =============================================================================
// Read Models
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleItemLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub subtotal: Money,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleTransactionLine {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transaction: SaleTransaction,
    pub account_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleDetails {
    #[serde(flatten)]
    pub sale: Sale,
    pub customer_name: String,
    pub customer_mobile: String,
    pub salesperson_name: String,
    pub due_amount: Money,
    pub items: Vec<SaleItemLine>,
    pub transactions: Vec<SaleTransactionLine>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleSummary {
    pub id: i64,
    pub memo_no: String,
    pub sale_date: NaiveDate,
    pub customer_name: String,
    pub customer_mobile: String,
    pub salesperson_name: String,
    pub total_items: i64,
    pub total_amount: Money,
    pub received_amount: Money,
    pub due_amount: Money,
    pub status: SaleStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SaleQuery {
    pub search: Option<String>,
    pub page: PageRequest,
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale, deducting stock for every item.
    #[instrument(skip(self, sale), fields(items = sale.items.len()))]
    pub async fn create(&self, branch_id: i64, sale: &NewSale) -> DbResult<Created> {
        validate_branch_id(branch_id)?;
        if let Err(e) = validate_new_sale(sale) {
            warn!(error = %e, "Rejected sale");
            return Err(e.into());
        }
        let memo_no = memo::resolve(sale.memo_no.as_deref(), sale.sale_date)?;
        let fp = sale.footprint(branch_id, &memo_no);

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                branch_id, memo_no, sale_date, salesperson_id, customer_id,
                total_items, total_amount, payment_account_id, received_amount,
                status, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, NULLIF(?, 0), ?, ?, ?)
            "#,
        )
        .bind(branch_id)
        .bind(&memo_no)
        .bind(sale.sale_date)
        .bind(sale.salesperson_id)
        .bind(sale.customer_id)
        .bind(fp.total_items)
        .bind(sale.total_amount)
        .bind(sale.payment_account_id)
        .bind(sale.received_amount)
        .bind(SaleStatus::Delivered)
        .bind(&sale.notes)
        .execute(&mut *tx)
        .await?;
        let sale_id = result.last_insert_rowid();

        insert_items(&mut tx, sale_id, &sale.items).await?;
        move_stock(&mut tx, branch_id, &sale.items, -1).await?;
        apply_side_effects(&mut tx, sale_id, &fp).await?;

        tx.commit().await?;

        info!(sale_id, memo_no = %memo_no, total = %sale.total_amount, "Sale created");
        Ok(Created {
            id: sale_id,
            memo_no,
        })
    }

    /// Replaces a sale that has not been returned.
    #[instrument(skip(self, sale), fields(items = sale.items.len()))]
    pub async fn update(&self, branch_id: i64, sale_id: i64, sale: &NewSale) -> DbResult<()> {
        validate_branch_id(branch_id)?;
        if let Err(e) = validate_new_sale(sale) {
            warn!(error = %e, "Rejected sale update");
            return Err(e.into());
        }

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let old = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ? AND branch_id = ?"))
            .bind(sale_id)
            .bind(branch_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        old.ensure_editable()?;

        let memo_no = match sale.memo_no.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => memo::resolve(Some(m), sale.sale_date)?,
            _ => old.memo_no.clone(),
        };
        let fp = sale.footprint(branch_id, &memo_no);

        let old_items = fetch_items(&mut tx, sale_id).await?;
        move_stock(&mut tx, branch_id, &old_items, 1).await?;
        move_stock(&mut tx, branch_id, &sale.items, -1).await?;

        reverse_side_effects(&mut tx, sale_id, &old.footprint()).await?;

        sqlx::query(
            r#"
            UPDATE sales SET
                memo_no = ?, sale_date = ?, salesperson_id = ?, customer_id = ?,
                total_items = ?, total_amount = ?, payment_account_id = NULLIF(?, 0),
                received_amount = ?, notes = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(&memo_no)
        .bind(sale.sale_date)
        .bind(sale.salesperson_id)
        .bind(sale.customer_id)
        .bind(fp.total_items)
        .bind(sale.total_amount)
        .bind(sale.payment_account_id)
        .bind(sale.received_amount)
        .bind(&sale.notes)
        .bind(sale_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, sale_id, &sale.items).await?;

        apply_side_effects(&mut tx, sale_id, &fp).await?;

        tx.commit().await?;

        info!(sale_id, memo_no = %memo_no, "Sale updated");
        Ok(())
    }

    pub async fn get(&self, branch_id: i64, sale_id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ? AND branch_id = ?"))
            .bind(sale_id)
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    pub async fn get_details(&self, branch_id: i64, sale_id: i64) -> DbResult<SaleDetails> {
        let sale = self
            .get(branch_id, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        let (customer_name, customer_mobile, salesperson_name): (String, String, String) =
            sqlx::query_as(
                "SELECT c.name, c.mobile, e.name FROM customers c, employees e WHERE c.id = ? AND e.id = ?",
            )
            .bind(sale.customer_id)
            .bind(sale.salesperson_id)
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, SaleItemLine>(
            r#"
            SELECT i.product_id, p.product_name, i.quantity, i.subtotal
            FROM sale_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.sale_id = ?
            ORDER BY i.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        let transactions = sqlx::query_as::<_, SaleTransactionLine>(
            r#"
            SELECT t.transaction_id, t.sale_id, t.transaction_date, t.memo_no,
                   t.payment_account_id, t.amount, t.transaction_type,
                   a.name AS account_name
            FROM sale_transactions t
            JOIN accounts a ON a.id = t.payment_account_id
            WHERE t.sale_id = ?
            ORDER BY t.transaction_id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SaleDetails {
            due_amount: sale.total_amount - sale.received_amount,
            sale,
            customer_name,
            customer_mobile,
            salesperson_name,
            items,
            transactions,
        })
    }

    pub async fn list(&self, branch_id: i64, query: &SaleQuery) -> DbResult<Page<SaleSummary>> {
        let pattern = query.search.as_ref().map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.memo_no, s.sale_date,
                   c.name AS customer_name, c.mobile AS customer_mobile,
                   e.name AS salesperson_name,
                   s.total_items, s.total_amount, s.received_amount,
                   s.total_amount - s.received_amount AS due_amount,
                   s.status
            FROM sales s
            JOIN customers c ON c.id = s.customer_id
            JOIN employees e ON e.id = s.salesperson_id
            WHERE s.branch_id = ?1
              AND (?2 IS NULL OR s.memo_no LIKE ?2 OR c.name LIKE ?2 OR c.mobile LIKE ?2)
            ORDER BY s.sale_date DESC, s.id DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(branch_id)
        .bind(&pattern)
        .bind(query.page.limit)
        .bind(query.page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sales s
            JOIN customers c ON c.id = s.customer_id
            WHERE s.branch_id = ?1
              AND (?2 IS NULL OR s.memo_no LIKE ?2 OR c.name LIKE ?2 OR c.mobile LIKE ?2)
            "#,
        )
        .bind(branch_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { rows, total_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{assert_balances_match_ledger, day, fixture, snapshot, Fixture};
    use branchbook_core::{CoreError, ValidationError};

    fn new_sale(fx: &Fixture, qty: i64, total: i64, received: i64) -> NewSale {
        NewSale {
            memo_no: None,
            sale_date: day(14),
            salesperson_id: fx.salesperson_id,
            customer_id: fx.customer_id,
            payment_account_id: fx.cash_account_id,
            total_amount: Money::from_cents(total),
            received_amount: Money::from_cents(received),
            notes: None,
            items: vec![LineItem {
                product_id: fx.product_id,
                quantity: qty,
                subtotal: Money::from_cents(total),
            }],
        }
    }

    #[tokio::test]
    async fn test_sale_deducts_stock_and_books_payment() {
        let fx = fixture().await;
        let created = fx
            .db
            .sales()
            .create(fx.branch_id, &new_sale(&fx, 3, 9_000, 9_000))
            .await
            .unwrap();

        let snap = snapshot(&fx, day(14)).await;
        assert_eq!(snap.stock, 7);
        assert_eq!(snap.ready_made, 3);
        assert_eq!(snap.sales_amount, 9_000);
        assert_eq!(snap.cash, 9_000);
        assert_eq!(snap.cash_balance, 9_000);
        assert_eq!(snap.due, 0);
        assert_eq!(snap.sale_amount, 9_000);
        assert_eq!(snap.progress_orders, 0);

        let sale = fx.db.sales().get(fx.branch_id, created.id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Delivered);

        let entries = fx
            .db
            .ledger()
            .by_memo(fx.branch_id, &format!("SALE-{}", created.memo_no))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].transaction_type, TransactionType::Payment);
        assert_balances_match_ledger(&fx).await;
    }

    #[tokio::test]
    async fn test_update_swaps_products_in_two_passes() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        let created = sales
            .create(fx.branch_id, &new_sale(&fx, 3, 9_000, 4_000))
            .await
            .unwrap();

        let mut replaced = new_sale(&fx, 4, 12_000, 12_000);
        replaced.payment_account_id = fx.bank_account_id;
        replaced.items = vec![
            LineItem {
                product_id: fx.other_product_id,
                quantity: 4,
                subtotal: Money::from_cents(8_000),
            },
            LineItem {
                product_id: fx.product_id,
                quantity: 1,
                subtotal: Money::from_cents(4_000),
            },
        ];
        sales.update(fx.branch_id, created.id, &replaced).await.unwrap();

        let snap = snapshot(&fx, day(14)).await;
        assert_eq!(snap.stock, 9);
        assert_eq!(snap.other_stock, 6);
        assert_eq!(snap.ready_made, 5);
        assert_eq!(snap.sales_amount, 12_000);
        assert_eq!(snap.cash, 0);
        assert_eq!(snap.bank, 12_000);
        assert_eq!(snap.cash_balance, 0);
        assert_eq!(snap.bank_balance, 12_000);
        assert_eq!(snap.due, 0);
        assert_eq!(snap.sale_amount, 12_000);

        let details = sales.get_details(fx.branch_id, created.id).await.unwrap();
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.items[0].product_name, "Kurti");
        assert_eq!(details.transactions.len(), 1);
        assert_eq!(details.transactions[0].account_name, "City Bank");
        assert_balances_match_ledger(&fx).await;
    }

    #[tokio::test]
    async fn test_update_with_same_values_is_net_zero() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        let sale = new_sale(&fx, 2, 6_000, 1_000);
        let created = sales.create(fx.branch_id, &sale).await.unwrap();
        let before = snapshot(&fx, day(14)).await;

        sales.update(fx.branch_id, created.id, &sale).await.unwrap();
        assert_eq!(snapshot(&fx, day(14)).await, before);
    }

    #[tokio::test]
    async fn test_returned_sale_is_immutable() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        let sale = new_sale(&fx, 2, 6_000, 6_000);
        let created = sales.create(fx.branch_id, &sale).await.unwrap();

        sqlx::query("UPDATE sales SET status = 'returned' WHERE id = ?")
            .bind(created.id)
            .execute(fx.db.pool())
            .await
            .unwrap();

        let err = sales.update(fx.branch_id, created.id, &sale).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SaleReturned { .. })));
        assert_eq!(snapshot(&fx, day(14)).await.stock, 8);
    }

    #[tokio::test]
    async fn test_failed_sale_restores_stock() {
        let fx = fixture().await;
        let mut sale = new_sale(&fx, 2, 6_000, 6_000);
        sale.payment_account_id = 9_999;

        let err = fx.db.sales().create(fx.branch_id, &sale).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(snapshot(&fx, day(14)).await.stock, 10);
    }

    #[tokio::test]
    async fn test_list_searches_customer() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        sales
            .create(fx.branch_id, &new_sale(&fx, 1, 3_000, 1_000))
            .await
            .unwrap();

        let page = sales
            .list(
                fx.branch_id,
                &SaleQuery {
                    search: Some("rahim".into()),
                    page: PageRequest::default(),
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows[0].due_amount.cents(), 2_000);

        let none = sales
            .list(
                fx.branch_id,
                &SaleQuery {
                    search: Some("zzz".into()),
                    page: PageRequest::default(),
                },
            )
            .await
            .unwrap();
        assert_eq!(none.total_count, 0);
    }

    #[tokio::test]
    async fn test_unpaid_sale_needs_no_account() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        let mut sale = new_sale(&fx, 2, 6_000, 0);
        sale.payment_account_id = 0;
        let before = snapshot(&fx, day(14)).await;

        let created = sales.create(fx.branch_id, &sale).await.unwrap();

        let snap = snapshot(&fx, day(14)).await;
        assert_eq!(snap.stock, 8);
        assert_eq!(snap.due, 6_000);
        assert_eq!(snap.cash, 0);
        assert_eq!(snap.bank, 0);
        assert_eq!(snap.cash_balance, before.cash_balance);
        assert_eq!(snap.ledger_entries, before.ledger_entries);

        let stored = sales.get(fx.branch_id, created.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_account_id, 0);

        sales.update(fx.branch_id, created.id, &sale).await.unwrap();
        assert_eq!(snapshot(&fx, day(14)).await, snap);

        let details = sales.get_details(fx.branch_id, created.id).await.unwrap();
        assert!(details.transactions.is_empty());
        assert_balances_match_ledger(&fx).await;
    }

    #[tokio::test]
    async fn test_overpaid_sale_changes_nothing() {
        let fx = fixture().await;
        let before = snapshot(&fx, day(14)).await;

        let err = fx
            .db
            .sales()
            .create(fx.branch_id, &new_sale(&fx, 2, 6_000, 6_001))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let mut negative = new_sale(&fx, 2, 6_000, 0);
        negative.received_amount = Money::from_cents(-1);
        assert!(fx.db.sales().create(fx.branch_id, &negative).await.is_err());

        assert_eq!(snapshot(&fx, day(14)).await, before);
        assert_balances_match_ledger(&fx).await;
    }

    #[tokio::test]
    async fn test_duplicate_memo_rejected() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        let mut sale = new_sale(&fx, 1, 3_000, 3_000);
        sale.memo_no = Some("0314DUP1".into());
        sales.create(fx.branch_id, &sale).await.unwrap();
        let after_first = snapshot(&fx, day(14)).await;

        let err = sales.create(fx.branch_id, &sale).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::DuplicateMemo)));
        assert_eq!(snapshot(&fx, day(14)).await, after_first);
    }
}
