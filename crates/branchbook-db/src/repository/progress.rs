//! # Employee Progress Repository
//!
//! Per-employee daily sheet, one row per `(employee_id, sheet_date)`.
//! Same add-delta discipline as the TopSheet.

use branchbook_core::{EmployeeProgress, ProgressDelta};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Adds `delta` to the progress row of `(employee_id, sheet_date)`,
/// creating the row if needed. A zero delta is a no-op.
pub(crate) async fn apply_progress_delta(
    conn: &mut SqliteConnection,
    branch_id: i64,
    employee_id: i64,
    sheet_date: NaiveDate,
    delta: &ProgressDelta,
) -> DbResult<()> {
    if delta.is_zero() {
        return Ok(());
    }

    debug!(branch_id, employee_id, %sheet_date, ?delta, "Applying progress delta");

    sqlx::query(
        r#"
        INSERT INTO employees_progress (
            sheet_date, branch_id, employee_id,
            sale_amount, sale_return_amount, order_count,
            production_units, overtime_hours, advance_payment, salary
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (sheet_date, employee_id) DO UPDATE SET
            sale_amount        = sale_amount        + excluded.sale_amount,
            sale_return_amount = sale_return_amount + excluded.sale_return_amount,
            order_count        = order_count        + excluded.order_count,
            production_units   = production_units   + excluded.production_units,
            overtime_hours     = overtime_hours     + excluded.overtime_hours,
            advance_payment    = advance_payment    + excluded.advance_payment,
            salary             = salary             + excluded.salary
        "#,
    )
    .bind(sheet_date)
    .bind(branch_id)
    .bind(employee_id)
    .bind(delta.sale_amount)
    .bind(delta.sale_return_amount)
    .bind(delta.order_count)
    .bind(delta.production_units)
    .bind(delta.overtime_hours)
    .bind(delta.advance_payment)
    .bind(delta.salary)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct ProgressRepository {
    pool: SqlitePool,
}

impl ProgressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProgressRepository { pool }
    }

    pub async fn get(
        &self,
        employee_id: i64,
        sheet_date: NaiveDate,
    ) -> DbResult<Option<EmployeeProgress>> {
        let progress = sqlx::query_as::<_, EmployeeProgress>(
            r#"
            SELECT sheet_date, branch_id, employee_id,
                   sale_amount, sale_return_amount, order_count,
                   production_units, overtime_hours, advance_payment, salary
            FROM employees_progress
            WHERE employee_id = ? AND sheet_date = ?
            "#,
        )
        .bind(employee_id)
        .bind(sheet_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{day, fixture};
    use branchbook_core::Money;

    #[tokio::test]
    async fn test_progress_deltas_accumulate_and_cancel() {
        let fx = fixture().await;
        let work = ProgressDelta::work_logged(12, 1.5, Money::from_cents(300));

        let mut conn = fx.db.pool().acquire().await.unwrap();
        apply_progress_delta(&mut conn, fx.branch_id, fx.worker_id, day(3), &work)
            .await
            .unwrap();
        apply_progress_delta(&mut conn, fx.branch_id, fx.worker_id, day(3), &work)
            .await
            .unwrap();
        drop(conn);

        let row = fx.db.progress().get(fx.worker_id, day(3)).await.unwrap().unwrap();
        assert_eq!(row.production_units, 24);
        assert_eq!(row.overtime_hours, 3.0);
        assert_eq!(row.advance_payment.cents(), 600);

        let mut conn = fx.db.pool().acquire().await.unwrap();
        for _ in 0..2 {
            apply_progress_delta(&mut conn, fx.branch_id, fx.worker_id, day(3), &-work)
                .await
                .unwrap();
        }
        drop(conn);

        let row = fx.db.progress().get(fx.worker_id, day(3)).await.unwrap().unwrap();
        assert_eq!(row.production_units, 0);
        assert_eq!(row.overtime_hours, 0.0);
        assert!(row.advance_payment.is_zero());
    }
}
