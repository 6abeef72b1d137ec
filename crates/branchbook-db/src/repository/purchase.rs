//! # Purchase Repository
//!
//! Material purchases paid out of the branch cash account.
//!
//! ```text
//! create   TopSheet.expense += total
//!          Ledger cash ──total──► supplier (Payment, PURCHASE-memo)
//!          cash balance -= total
//! update   revert stored purchase, apply new values
//! delete   revert stored purchase, remove the row
//! ```

use branchbook_core::memo::{self, LedgerTag};
use branchbook_core::validation::{validate_branch_id, validate_new_purchase};
use branchbook_core::{
    DateRange, EntityRef, Money, NewLedgerEntry, NewPurchase, PageRequest, Purchase, Report,
    TopSheetDelta, TransactionType,
};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument, warn};

use crate::error::{DbError, DbResult};
use crate::repository::account::{adjust_balance, lock_branch_cash_account};
use crate::repository::branch::lock_branch;
use crate::repository::ledger;
use crate::repository::top_sheet::apply_top_sheet_delta;
use crate::repository::Created;

const SELECT_PURCHASE: &str = r#"
    SELECT id, branch_id, memo_no, purchase_date, supplier_id, total_amount, notes
    FROM purchase
"#;

async fn apply_side_effects(conn: &mut SqliteConnection, purchase: &Purchase) -> DbResult<()> {
    apply_top_sheet_delta(
        conn,
        purchase.branch_id,
        purchase.purchase_date,
        &TopSheetDelta::expense(purchase.total_amount),
    )
    .await?;

    if purchase.total_amount.is_positive() {
        let cash = lock_branch_cash_account(conn, purchase.branch_id).await?;
        ledger::append(
            conn,
            &NewLedgerEntry {
                transaction_date: purchase.purchase_date,
                memo_no: Some(LedgerTag::Purchase.memo(&purchase.memo_no)),
                branch_id: purchase.branch_id,
                from: EntityRef::Account(cash.id),
                to: EntityRef::Supplier(purchase.supplier_id),
                amount: purchase.total_amount,
                transaction_type: TransactionType::Payment,
                notes: Some("Payment for Material Purchase".to_string()),
            },
        )
        .await?;
        adjust_balance(conn, cash.id, -purchase.total_amount).await?;
    }

    debug!(memo_no = %purchase.memo_no, "Purchase side effects applied");
    Ok(())
}

async fn reverse_side_effects(conn: &mut SqliteConnection, purchase: &Purchase) -> DbResult<()> {
    apply_top_sheet_delta(
        conn,
        purchase.branch_id,
        purchase.purchase_date,
        &-TopSheetDelta::expense(purchase.total_amount),
    )
    .await?;

    if purchase.total_amount.is_positive() {
        let cash = lock_branch_cash_account(conn, purchase.branch_id).await?;
        ledger::delete_by_memo(
            conn,
            purchase.branch_id,
            &LedgerTag::Purchase.memo(&purchase.memo_no),
            TransactionType::Payment,
        )
        .await?;
        adjust_balance(conn, cash.id, purchase.total_amount).await?;
    }

    debug!(memo_no = %purchase.memo_no, "Purchase side effects reversed");
    Ok(())
}

async fn ensure_supplier(conn: &mut SqliteConnection, branch_id: i64, supplier_id: i64) -> DbResult<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM suppliers WHERE id = ? AND branch_id = ?")
            .bind(supplier_id)
            .bind(branch_id)
            .fetch_optional(&mut *conn)
            .await?;

    found
        .map(|_| ())
        .ok_or_else(|| DbError::not_found("Supplier", supplier_id))
}

async fn fetch_purchase(
    conn: &mut SqliteConnection,
    branch_id: i64,
    purchase_id: i64,
) -> DbResult<Purchase> {
    sqlx::query_as::<_, Purchase>(&format!("{SELECT_PURCHASE} WHERE id = ? AND branch_id = ?"))
        .bind(purchase_id)
        .bind(branch_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Purchase", purchase_id))
}

/// Filter for [`PurchaseRepository::report`]. Search matches memo, supplier
/// name or supplier mobile.
#[derive(Debug, Clone)]
pub struct PurchaseQuery {
    pub range: DateRange,
    pub search: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PurchaseLine {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub purchase: Purchase,
    pub supplier_name: String,
    pub supplier_mobile: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PurchaseTotals {
    pub total_purchases: i64,
    pub total_amount: Money,
}

#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    #[instrument(skip(self, purchase), fields(supplier_id = purchase.supplier_id))]
    pub async fn create(&self, branch_id: i64, purchase: &NewPurchase) -> DbResult<Created> {
        validate_branch_id(branch_id)?;
        if let Err(e) = validate_new_purchase(purchase) {
            warn!(error = %e, "Rejected purchase");
            return Err(e.into());
        }
        let memo_no = memo::resolve(purchase.memo_no.as_deref(), purchase.purchase_date)?;

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;
        ensure_supplier(&mut tx, branch_id, purchase.supplier_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO purchase (branch_id, memo_no, purchase_date, supplier_id, total_amount, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(branch_id)
        .bind(&memo_no)
        .bind(purchase.purchase_date)
        .bind(purchase.supplier_id)
        .bind(purchase.total_amount)
        .bind(&purchase.notes)
        .execute(&mut *tx)
        .await?;

        let stored = Purchase {
            id: result.last_insert_rowid(),
            branch_id,
            memo_no,
            purchase_date: purchase.purchase_date,
            supplier_id: purchase.supplier_id,
            total_amount: purchase.total_amount,
            notes: purchase.notes.clone(),
        };
        apply_side_effects(&mut tx, &stored).await?;

        tx.commit().await?;

        info!(purchase_id = stored.id, memo_no = %stored.memo_no, total = %stored.total_amount, "Purchase created");
        Ok(Created {
            id: stored.id,
            memo_no: stored.memo_no,
        })
    }

    /// Replaces a purchase. A missing memo keeps the stored one.
    #[instrument(skip(self, purchase))]
    pub async fn update(&self, branch_id: i64, purchase_id: i64, purchase: &NewPurchase) -> DbResult<()> {
        validate_branch_id(branch_id)?;
        validate_new_purchase(purchase)?;

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let old = fetch_purchase(&mut tx, branch_id, purchase_id).await?;
        ensure_supplier(&mut tx, branch_id, purchase.supplier_id).await?;
        reverse_side_effects(&mut tx, &old).await?;

        let memo_no = match purchase.memo_no.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => memo::resolve(Some(m), purchase.purchase_date)?,
            _ => old.memo_no.clone(),
        };
        let new = Purchase {
            id: old.id,
            branch_id,
            memo_no,
            purchase_date: purchase.purchase_date,
            supplier_id: purchase.supplier_id,
            total_amount: purchase.total_amount,
            notes: purchase.notes.clone(),
        };

        sqlx::query(
            r#"
            UPDATE purchase SET
                memo_no = ?, purchase_date = ?, supplier_id = ?, total_amount = ?, notes = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(&new.memo_no)
        .bind(new.purchase_date)
        .bind(new.supplier_id)
        .bind(new.total_amount)
        .bind(&new.notes)
        .bind(new.id)
        .execute(&mut *tx)
        .await?;

        apply_side_effects(&mut tx, &new).await?;

        tx.commit().await?;

        info!(purchase_id, memo_no = %new.memo_no, "Purchase updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, branch_id: i64, purchase_id: i64) -> DbResult<()> {
        validate_branch_id(branch_id)?;

        let mut tx = self.pool.begin().await?;
        lock_branch(&mut tx, branch_id).await?;

        let old = fetch_purchase(&mut tx, branch_id, purchase_id).await?;
        reverse_side_effects(&mut tx, &old).await?;

        sqlx::query("DELETE FROM purchase WHERE id = ?")
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(purchase_id, memo_no = %old.memo_no, "Purchase deleted");
        Ok(())
    }

    pub async fn get(&self, branch_id: i64, purchase_id: i64) -> DbResult<Option<Purchase>> {
        let purchase =
            sqlx::query_as::<_, Purchase>(&format!("{SELECT_PURCHASE} WHERE id = ? AND branch_id = ?"))
                .bind(purchase_id)
                .bind(branch_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(purchase)
    }

    /// Purchases in the range, newest first, with totals over the full
    /// filtered set.
    pub async fn report(
        &self,
        branch_id: i64,
        query: &PurchaseQuery,
    ) -> DbResult<Report<PurchaseLine, PurchaseTotals>> {
        let pattern = query.search.as_ref().map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT p.id, p.branch_id, p.memo_no, p.purchase_date, p.supplier_id,
                   p.total_amount, p.notes,
                   s.name AS supplier_name, s.mobile AS supplier_mobile
            FROM purchase p
            JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.branch_id = ?1
              AND p.purchase_date BETWEEN ?2 AND ?3
              AND (?4 IS NULL OR p.memo_no LIKE ?4 OR s.name LIKE ?4 OR s.mobile LIKE ?4)
            ORDER BY p.purchase_date DESC, p.id DESC
            LIMIT ?5 OFFSET ?6
            "#,
        )
        .bind(branch_id)
        .bind(query.range.start)
        .bind(query.range.end)
        .bind(&pattern)
        .bind(query.page.limit)
        .bind(query.page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total_purchases, total_amount): (i64, Money) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(p.total_amount), 0)
            FROM purchase p
            JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.branch_id = ?1
              AND p.purchase_date BETWEEN ?2 AND ?3
              AND (?4 IS NULL OR p.memo_no LIKE ?4 OR s.name LIKE ?4 OR s.mobile LIKE ?4)
            "#,
        )
        .bind(branch_id)
        .bind(query.range.start)
        .bind(query.range.end)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(Report {
            rows,
            total_count: total_purchases,
            totals: PurchaseTotals {
                total_purchases,
                total_amount,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{assert_balances_match_ledger, day, fixture, snapshot, Fixture};

    fn new_purchase(fx: &Fixture, total: i64) -> NewPurchase {
        NewPurchase {
            memo_no: None,
            purchase_date: day(5),
            supplier_id: fx.supplier_id,
            total_amount: Money::from_cents(total),
            notes: Some("Cotton rolls".into()),
        }
    }

    #[tokio::test]
    async fn test_purchase_create_update_delete() {
        let fx = fixture().await;
        let purchases = fx.db.purchases();

        let created = purchases
            .create(fx.branch_id, &new_purchase(&fx, 25_000))
            .await
            .unwrap();
        let snap = snapshot(&fx, day(5)).await;
        assert_eq!(snap.expense, 25_000);
        assert_eq!(snap.cash_balance, -25_000);
        assert_eq!(snap.ledger_entries, 1);

        let entries = fx
            .db
            .ledger()
            .by_memo(fx.branch_id, &format!("PURCHASE-{}", created.memo_no))
            .await
            .unwrap();
        assert_eq!(entries[0].from, EntityRef::Account(fx.cash_account_id));
        assert_eq!(entries[0].to, EntityRef::Supplier(fx.supplier_id));

        let mut changed = new_purchase(&fx, 30_000);
        changed.purchase_date = day(6);
        purchases.update(fx.branch_id, created.id, &changed).await.unwrap();
        assert_eq!(snapshot(&fx, day(5)).await.expense, 0);
        let snap = snapshot(&fx, day(6)).await;
        assert_eq!(snap.expense, 30_000);
        assert_eq!(snap.cash_balance, -30_000);
        assert_eq!(snap.ledger_entries, 1);
        assert_balances_match_ledger(&fx).await;

        purchases.delete(fx.branch_id, created.id).await.unwrap();
        let snap = snapshot(&fx, day(6)).await;
        assert_eq!(snap.expense, 0);
        assert_eq!(snap.cash_balance, 0);
        assert_eq!(snap.ledger_entries, 0);
        assert!(purchases.get(fx.branch_id, created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_report_totals_and_search() {
        let fx = fixture().await;
        let purchases = fx.db.purchases();
        for total in [1_000, 2_000, 3_000] {
            purchases
                .create(fx.branch_id, &new_purchase(&fx, total))
                .await
                .unwrap();
        }

        let report = purchases
            .report(
                fx.branch_id,
                &PurchaseQuery {
                    range: DateRange::new(day(1), day(31)).unwrap(),
                    search: Some("fabric".into()),
                    page: PageRequest::one_based(Some(1), Some(2)),
                },
            )
            .await
            .unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total_count, 3);
        assert_eq!(report.totals.total_amount.cents(), 6_000);
        assert_eq!(report.rows[0].supplier_name, "Fabric House");

        let outside = purchases
            .report(
                fx.branch_id,
                &PurchaseQuery {
                    range: DateRange::single(day(7)),
                    search: None,
                    page: PageRequest::default(),
                },
            )
            .await
            .unwrap();
        assert_eq!(outside.total_count, 0);
        assert!(outside.totals.total_amount.is_zero());
    }

    #[tokio::test]
    async fn test_missing_purchase_and_supplier() {
        let fx = fixture().await;
        let purchases = fx.db.purchases();

        let err = purchases.delete(fx.branch_id, 77).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let mut purchase = new_purchase(&fx, 500);
        purchase.supplier_id = 9_999;
        let err = purchases.create(fx.branch_id, &purchase).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(snapshot(&fx, day(5)).await.expense, 0);
    }
}
