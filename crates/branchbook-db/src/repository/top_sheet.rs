//! # TopSheet Repository
//!
//! The daily branch summary. One row per `(branch_id, sheet_date)`, only
//! ever changed by adding a [`TopSheetDelta`] to it.
//!
//! ## Delta Upsert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_top_sheet_delta(conn, b1, 2025-03-14, { cash: +40, orders: +2 }) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ... VALUES (2025-03-14, b1, 0, 40, 0, 2, ...)                  │
//! │  ON CONFLICT (sheet_date, branch_id)                                   │
//! │  DO UPDATE SET cash = cash + excluded.cash, ...                        │
//! │                                                                         │
//! │  Row absent  → created with the delta as its values                    │
//! │  Row present → delta added column by column                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The write helper takes the caller's open connection so it commits or
//! rolls back with the rest of the business event.

use branchbook_core::{TopSheet, TopSheetDelta};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Adds `delta` to the TopSheet row of `(branch_id, sheet_date)`,
/// creating the row if needed. A zero delta is a no-op.
pub(crate) async fn apply_top_sheet_delta(
    conn: &mut SqliteConnection,
    branch_id: i64,
    sheet_date: NaiveDate,
    delta: &TopSheetDelta,
) -> DbResult<()> {
    if delta.is_zero() {
        return Ok(());
    }

    debug!(branch_id, %sheet_date, ?delta, "Applying top sheet delta");

    sqlx::query(
        r#"
        INSERT INTO top_sheet (
            sheet_date, branch_id,
            expense, cash, bank,
            order_count, delivery, cancelled, ready_made, sales_amount
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (sheet_date, branch_id) DO UPDATE SET
            expense      = expense      + excluded.expense,
            cash         = cash         + excluded.cash,
            bank         = bank         + excluded.bank,
            order_count  = order_count  + excluded.order_count,
            delivery     = delivery     + excluded.delivery,
            cancelled    = cancelled    + excluded.cancelled,
            ready_made   = ready_made   + excluded.ready_made,
            sales_amount = sales_amount + excluded.sales_amount
        "#,
    )
    .bind(sheet_date)
    .bind(branch_id)
    .bind(delta.expense)
    .bind(delta.cash)
    .bind(delta.bank)
    .bind(delta.order_count)
    .bind(delta.delivery)
    .bind(delta.cancelled)
    .bind(delta.ready_made)
    .bind(delta.sales_amount)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Read access to TopSheet rows.
#[derive(Debug, Clone)]
pub struct TopSheetRepository {
    pool: SqlitePool,
}

impl TopSheetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TopSheetRepository { pool }
    }

    /// Gets the sheet of one branch for one day, if anything was recorded.
    pub async fn get(&self, branch_id: i64, sheet_date: NaiveDate) -> DbResult<Option<TopSheet>> {
        let sheet = sqlx::query_as::<_, TopSheet>(
            r#"
            SELECT sheet_date, branch_id, expense, cash, bank,
                   order_count, delivery, cancelled, ready_made, sales_amount
            FROM top_sheet
            WHERE branch_id = ? AND sheet_date = ?
            "#,
        )
        .bind(branch_id)
        .bind(sheet_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{day, fixture};
    use branchbook_core::{AccountType, Money};

    #[tokio::test]
    async fn test_first_delta_creates_row() {
        let fx = fixture().await;
        let delta = TopSheetDelta::order_placed(2, Money::from_cents(4_000), AccountType::Cash);

        let mut conn = fx.db.pool().acquire().await.unwrap();
        apply_top_sheet_delta(&mut conn, fx.branch_id, day(14), &delta)
            .await
            .unwrap();
        drop(conn);

        let sheet = fx.db.top_sheets().get(fx.branch_id, day(14)).await.unwrap().unwrap();
        assert_eq!(sheet.order_count, 2);
        assert_eq!(sheet.cash.cents(), 4_000);
        assert!(sheet.bank.is_zero());
    }

    #[tokio::test]
    async fn test_delta_then_negation_restores_row() {
        let fx = fixture().await;
        let base = TopSheetDelta::expense(Money::from_cents(700));
        let delta = TopSheetDelta::delivery(3, Money::from_cents(1_234), AccountType::Bank);

        let mut conn = fx.db.pool().acquire().await.unwrap();
        apply_top_sheet_delta(&mut conn, fx.branch_id, day(14), &base).await.unwrap();
        apply_top_sheet_delta(&mut conn, fx.branch_id, day(14), &delta).await.unwrap();
        apply_top_sheet_delta(&mut conn, fx.branch_id, day(14), &-delta).await.unwrap();
        drop(conn);

        let sheet = fx.db.top_sheets().get(fx.branch_id, day(14)).await.unwrap().unwrap();
        assert_eq!(sheet.expense.cents(), 700);
        assert_eq!(sheet.delivery, 0);
        assert!(sheet.bank.is_zero());
    }

    #[tokio::test]
    async fn test_zero_delta_writes_nothing() {
        let fx = fixture().await;
        let mut conn = fx.db.pool().acquire().await.unwrap();
        apply_top_sheet_delta(&mut conn, fx.branch_id, day(14), &TopSheetDelta::default())
            .await
            .unwrap();
        drop(conn);

        assert!(fx.db.top_sheets().get(fx.branch_id, day(14)).await.unwrap().is_none());
    }
}
