//! Report endpoints.
//!
//! ```text
//! /reports/orders/overview     report_type + date   -> per-status counts
//! /reports/branch              range + page         -> TopSheet rows
//! /reports/employee/progress   range + search       -> salesperson rows
//! /reports/worker/progress     range + report_type  -> bucketed worker rows
//! /reports/employee/salaries   range + employee_id  -> salary rows
//! /reports/top-sheet           date                 -> one TopSheet
//! ```

use std::sync::Arc;

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use branchbook_core::query::parse_date;
use branchbook_core::{ReportPeriod, TopSheet};
use branchbook_db::{
    BranchReportRow, BranchTotals, OrderOverview, SalaryRow, SalaryTotals,
    SalespersonProgressRow, SalespersonTotals, WorkerProgressRow,
};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::Success;
use crate::routes::{date_range, today, ListParams};
use crate::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
    /// `daily` when absent.
    pub report_type: Option<String>,
    /// Reference date; today when absent.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WorkerProgressParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub report_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SalaryParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub employee_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DayParams {
    pub date: Option<String>,
}

fn period(raw: Option<&str>) -> Result<ReportPeriod, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(ReportPeriod::Daily),
        Some(raw) => Ok(raw.parse::<ReportPeriod>()?),
    }
}

fn day(raw: Option<&str>) -> Result<chrono::NaiveDate, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today()),
        Some(raw) => Ok(parse_date("date", raw)?),
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub overview: OrderOverview,
}

#[derive(Debug, Serialize)]
pub struct BranchReport {
    pub rows: Vec<BranchReportRow>,
    pub total_count: i64,
    pub totals: BranchTotals,
}

#[derive(Debug, Serialize)]
pub struct SalespersonReport {
    pub rows: Vec<SalespersonProgressRow>,
    pub total_count: i64,
    pub totals: SalespersonTotals,
}

#[derive(Debug, Serialize)]
pub struct WorkerReport {
    pub report_type: ReportPeriod,
    pub rows: Vec<WorkerProgressRow>,
}

#[derive(Debug, Serialize)]
pub struct SalaryReport {
    pub rows: Vec<SalaryRow>,
    pub total_count: i64,
    pub totals: SalaryTotals,
}

#[derive(Debug, Serialize)]
pub struct TopSheetView {
    pub top_sheet: Option<TopSheet>,
}

// -- Handlers --

/// GET /reports/orders/overview
#[tracing::instrument(skip(state))]
pub async fn order_overview(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<OverviewParams>,
) -> Result<Success<OverviewResponse>, ApiError> {
    let period = period(params.report_type.as_deref())?;
    let reference = day(params.date.as_deref())?;
    let overview = state
        .db
        .reports()
        .order_overview(branch_id, period, reference)
        .await?;
    Ok(Success::new(
        "Order overview retrieved successfully",
        OverviewResponse { overview },
    ))
}

/// GET /reports/branch
#[tracing::instrument(skip(state))]
pub async fn branch(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<BranchReport>, ApiError> {
    let report = state
        .db
        .reports()
        .branch_report(branch_id, params.range()?, params.page(&state))
        .await?;
    Ok(Success::new(
        "Branch report retrieved successfully",
        BranchReport {
            rows: report.rows,
            total_count: report.total_count,
            totals: report.totals,
        },
    ))
}

/// GET /reports/employee/progress
#[tracing::instrument(skip(state))]
pub async fn salesperson_progress(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<SalespersonReport>, ApiError> {
    let search = params.search()?;
    let report = state
        .db
        .reports()
        .salesperson_progress(
            branch_id,
            params.range()?,
            search.as_deref(),
            params.page(&state),
        )
        .await?;
    Ok(Success::new(
        "Salesperson progress retrieved successfully",
        SalespersonReport {
            rows: report.rows,
            total_count: report.total_count,
            totals: report.totals,
        },
    ))
}

/// GET /reports/worker/progress
#[tracing::instrument(skip(state))]
pub async fn worker_progress(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<WorkerProgressParams>,
) -> Result<Success<WorkerReport>, ApiError> {
    let report_type = period(params.report_type.as_deref())?;
    let range = date_range(&params.start_date, &params.end_date)?;
    let rows = state
        .db
        .reports()
        .worker_progress(branch_id, range, report_type)
        .await?;
    Ok(Success::new(
        "Worker progress retrieved successfully",
        WorkerReport { report_type, rows },
    ))
}

/// GET /reports/employee/salaries
#[tracing::instrument(skip(state))]
pub async fn salaries(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<SalaryParams>,
) -> Result<Success<SalaryReport>, ApiError> {
    let range = date_range(&params.start_date, &params.end_date)?;
    let employee_id = params.employee_id.filter(|id| *id > 0);
    let report = state
        .db
        .reports()
        .salary_report(branch_id, range, employee_id)
        .await?;
    Ok(Success::new(
        "Salary report retrieved successfully",
        SalaryReport {
            rows: report.rows,
            total_count: report.total_count,
            totals: report.totals,
        },
    ))
}

/// GET /reports/top-sheet
#[tracing::instrument(skip(state))]
pub async fn top_sheet(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<DayParams>,
) -> Result<Success<TopSheetView>, ApiError> {
    let date = day(params.date.as_deref())?;
    let top_sheet = state.db.top_sheets().get(branch_id, date).await?;
    Ok(Success::new("Top sheet retrieved successfully", TopSheetView { top_sheet }))
}
