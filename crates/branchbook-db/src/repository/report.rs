//! # Report Repository
//!
//! Read-only reports over the rollup tables and the order headers.
//!
//! ## Sources
//! ```text
//! ┌───────────────────────┬────────────────────────────────────────────────┐
//! │ order_overview        │ orders, grouped by status, within a period     │
//! │ branch_report         │ top_sheet rows + derived total and balance     │
//! │ salesperson_progress  │ employees_progress ⋈ employees (salesperson)   │
//! │ worker_progress       │ employees_progress ⋈ employees (worker),       │
//! │                       │ bucketed by day / week / month / year / all    │
//! │ salary_report         │ employees_progress rows with salary > 0        │
//! └───────────────────────┴────────────────────────────────────────────────┘
//! ```
//!
//! Totals are computed over the full filtered set, independent of the page.

use branchbook_core::{
    DateRange, EmployeeRole, Money, OrderStatus, PageRequest, Report, ReportPeriod, TopSheet,
};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;

// =============================================================================
// Order Overview
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub count: i64,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderOverview {
    pub period: ReportPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pending: StatusSummary,
    pub partial: StatusSummary,
    pub delivered: StatusSummary,
    pub cancelled: StatusSummary,
    pub total: StatusSummary,
}

// =============================================================================
// Branch Report
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BranchReportRow {
    #[serde(flatten)]
    pub sheet: TopSheet,
    pub total_amount: Money,
    pub balance: Money,
}

impl From<TopSheet> for BranchReportRow {
    fn from(sheet: TopSheet) -> Self {
        BranchReportRow {
            total_amount: sheet.total_amount(),
            balance: sheet.balance(),
            sheet,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct BranchTotals {
    pub expense: Money,
    pub cash: Money,
    pub bank: Money,
    pub total_amount: Money,
    pub balance: Money,
    pub order_count: i64,
    pub delivery: i64,
    pub cancelled: i64,
    pub ready_made: i64,
    pub sales_amount: Money,
}

// =============================================================================
// Employee Reports
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalespersonProgressRow {
    pub sheet_date: NaiveDate,
    pub employee_id: i64,
    pub employee_name: String,
    pub sale_amount: Money,
    pub sale_return_amount: Money,
    pub order_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct SalespersonTotals {
    pub sale_amount: Money,
    pub sale_return_amount: Money,
    pub order_count: i64,
}

/// One worker's output within one period bucket.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WorkerProgressRow {
    pub period: String,
    pub employee_id: i64,
    pub employee_name: String,
    pub production_units: i64,
    pub overtime_hours: f64,
    pub advance_payment: Money,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalaryRow {
    pub sheet_date: NaiveDate,
    pub employee_id: i64,
    pub employee_name: String,
    pub role: EmployeeRole,
    pub salary: Money,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SalaryTotals {
    pub total_salary: Money,
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Order counts and amounts per status for the period containing
    /// `reference`.
    pub async fn order_overview(
        &self,
        branch_id: i64,
        period: ReportPeriod,
        reference: NaiveDate,
    ) -> DbResult<OrderOverview> {
        let window = period.window(reference);

        let groups: Vec<(OrderStatus, i64, Money)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM orders
            WHERE branch_id = ? AND order_date BETWEEN ? AND ?
            GROUP BY status
            "#,
        )
        .bind(branch_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let mut overview = OrderOverview {
            period,
            start_date: window.start,
            end_date: window.end,
            pending: StatusSummary::default(),
            partial: StatusSummary::default(),
            delivered: StatusSummary::default(),
            cancelled: StatusSummary::default(),
            total: StatusSummary::default(),
        };

        for (status, count, amount) in groups {
            let summary = StatusSummary { count, amount };
            match status {
                OrderStatus::Pending => overview.pending = summary,
                OrderStatus::Partial => overview.partial = summary,
                OrderStatus::Delivered => overview.delivered = summary,
                OrderStatus::Cancelled => overview.cancelled = summary,
                OrderStatus::Checkout => {}
            }
            overview.total.count += count;
            overview.total.amount += amount;
        }

        Ok(overview)
    }

    /// Daily TopSheet rows in the range, newest first.
    pub async fn branch_report(
        &self,
        branch_id: i64,
        range: DateRange,
        page: PageRequest,
    ) -> DbResult<Report<BranchReportRow, BranchTotals>> {
        let sheets = sqlx::query_as::<_, TopSheet>(
            r#"
            SELECT sheet_date, branch_id, expense, cash, bank,
                   order_count, delivery, cancelled, ready_made, sales_amount
            FROM top_sheet
            WHERE branch_id = ? AND sheet_date BETWEEN ? AND ?
            ORDER BY sheet_date DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM top_sheet WHERE branch_id = ? AND sheet_date BETWEEN ? AND ?",
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let totals = sqlx::query_as::<_, BranchTotals>(
            r#"
            SELECT COALESCE(SUM(expense), 0)                      AS expense,
                   COALESCE(SUM(cash), 0)                         AS cash,
                   COALESCE(SUM(bank), 0)                         AS bank,
                   COALESCE(SUM(cash + bank), 0)                  AS total_amount,
                   COALESCE(SUM(cash + bank - expense), 0)        AS balance,
                   COALESCE(SUM(order_count), 0)                  AS order_count,
                   COALESCE(SUM(delivery), 0)                     AS delivery,
                   COALESCE(SUM(cancelled), 0)                    AS cancelled,
                   COALESCE(SUM(ready_made), 0)                   AS ready_made,
                   COALESCE(SUM(sales_amount), 0)                 AS sales_amount
            FROM top_sheet
            WHERE branch_id = ? AND sheet_date BETWEEN ? AND ?
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(Report {
            rows: sheets.into_iter().map(BranchReportRow::from).collect(),
            total_count,
            totals,
        })
    }

    /// Salesperson progress rows, optionally filtered by employee name.
    pub async fn salesperson_progress(
        &self,
        branch_id: i64,
        range: DateRange,
        search: Option<&str>,
        page: PageRequest,
    ) -> DbResult<Report<SalespersonProgressRow, SalespersonTotals>> {
        let pattern = search.map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, SalespersonProgressRow>(
            r#"
            SELECT p.sheet_date, p.employee_id, e.name AS employee_name,
                   p.sale_amount, p.sale_return_amount, p.order_count
            FROM employees_progress p
            JOIN employees e ON e.id = p.employee_id
            WHERE p.branch_id = ?1
              AND e.role = ?2
              AND p.sheet_date BETWEEN ?3 AND ?4
              AND (?5 IS NULL OR e.name LIKE ?5)
            ORDER BY p.sheet_date DESC, e.name
            LIMIT ?6 OFFSET ?7
            "#,
        )
        .bind(branch_id)
        .bind(EmployeeRole::Salesperson)
        .bind(range.start)
        .bind(range.end)
        .bind(&pattern)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total_count, sale_amount, sale_return_amount, order_count): (i64, Money, Money, i64) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(p.sale_amount), 0),
                       COALESCE(SUM(p.sale_return_amount), 0),
                       COALESCE(SUM(p.order_count), 0)
                FROM employees_progress p
                JOIN employees e ON e.id = p.employee_id
                WHERE p.branch_id = ?1
                  AND e.role = ?2
                  AND p.sheet_date BETWEEN ?3 AND ?4
                  AND (?5 IS NULL OR e.name LIKE ?5)
                "#,
            )
            .bind(branch_id)
            .bind(EmployeeRole::Salesperson)
            .bind(range.start)
            .bind(range.end)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok(Report {
            rows,
            total_count,
            totals: SalespersonTotals {
                sale_amount,
                sale_return_amount,
                order_count,
            },
        })
    }

    /// Worker output summed per worker and per period bucket. `All`
    /// collapses the whole range into one bucket per worker.
    pub async fn worker_progress(
        &self,
        branch_id: i64,
        range: DateRange,
        period: ReportPeriod,
    ) -> DbResult<Vec<WorkerProgressRow>> {
        let rows = sqlx::query_as::<_, WorkerProgressRow>(
            r#"
            SELECT CASE WHEN ?4 = 'all' THEN 'all' ELSE strftime(?4, p.sheet_date) END AS period,
                   p.employee_id,
                   e.name AS employee_name,
                   COALESCE(SUM(p.production_units), 0) AS production_units,
                   COALESCE(SUM(p.overtime_hours), 0.0) AS overtime_hours,
                   COALESCE(SUM(p.advance_payment), 0) AS advance_payment
            FROM employees_progress p
            JOIN employees e ON e.id = p.employee_id
            WHERE p.branch_id = ?1
              AND e.role = ?5
              AND p.sheet_date BETWEEN ?2 AND ?3
            GROUP BY period, p.employee_id
            ORDER BY period, e.name
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .bind(period.bucket_format())
        .bind(EmployeeRole::Worker)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Progress rows that carry a salary, optionally for one employee.
    pub async fn salary_report(
        &self,
        branch_id: i64,
        range: DateRange,
        employee_id: Option<i64>,
    ) -> DbResult<Report<SalaryRow, SalaryTotals>> {
        let rows = sqlx::query_as::<_, SalaryRow>(
            r#"
            SELECT p.sheet_date, p.employee_id, e.name AS employee_name, e.role, p.salary
            FROM employees_progress p
            JOIN employees e ON e.id = p.employee_id
            WHERE p.branch_id = ?1
              AND p.salary > 0
              AND p.sheet_date BETWEEN ?2 AND ?3
              AND (?4 IS NULL OR p.employee_id = ?4)
            ORDER BY p.sheet_date DESC, e.name
            "#,
        )
        .bind(branch_id)
        .bind(range.start)
        .bind(range.end)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        let total_salary = rows.iter().map(|r| r.salary).sum();

        Ok(Report {
            total_count: rows.len() as i64,
            rows,
            totals: SalaryTotals { total_salary },
        })
    }
}
