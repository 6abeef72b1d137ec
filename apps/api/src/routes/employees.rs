//! Employee directory and payroll endpoints.
//!
//! Salary payments and worker progress are keyed by memo number for
//! updates; the stored payroll entry is what an update reverts before
//! applying the new values. The chairman never appears in the directory.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use branchbook_core::validation::validate_search_query;
use branchbook_core::{
    Employee, EmployeeRole, NewEmployee, PayrollEntry, SalaryPayment, WorkerProgress,
};
use branchbook_db::{DbError, EmployeeQuery};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::{Empty, Success};
use crate::routes::page_request;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EmployeeListParams {
    #[serde(alias = "pageIndex")]
    pub page: Option<i64>,
    #[serde(alias = "pageLength")]
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<EmployeeRole>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeList {
    pub employees: Vec<Employee>,
    pub total_count: i64,
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct EmployeeView {
    pub employee: Employee,
}

#[derive(Debug, Serialize)]
pub struct PayrollCreated {
    pub entry_id: i64,
    pub memo_no: String,
}

#[derive(Debug, Serialize)]
pub struct PayrollView {
    pub entry: PayrollEntry,
}

/// POST /employees
#[tracing::instrument(skip(state, employee))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(employee): Json<NewEmployee>,
) -> Result<(StatusCode, Json<Success<EmployeeView>>), ApiError> {
    let employee = state.db.employees().create(branch_id, &employee).await?;
    Ok(Success::new("Employee added successfully", EmployeeView { employee })
        .with_status(StatusCode::CREATED))
}

/// GET /employees
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<EmployeeListParams>,
) -> Result<Success<EmployeeList>, ApiError> {
    let query = EmployeeQuery {
        role: params.role,
        search: validate_search_query(params.search.as_deref())?,
        page: page_request(&state, params.page, params.limit),
    };
    let page = state.db.employees().list(branch_id, &query).await?;
    Ok(Success::new(
        "Employees retrieved successfully",
        EmployeeList {
            employees: page.rows,
            total_count: page.total_count,
            page: query.page.page,
        },
    ))
}

/// GET /employees/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(employee_id): Path<i64>,
) -> Result<Success<EmployeeView>, ApiError> {
    let employee = state
        .db
        .employees()
        .get_in_branch(branch_id, employee_id)
        .await?
        .ok_or_else(|| DbError::not_found("Employee", employee_id))?;
    Ok(Success::new("Employee retrieved successfully", EmployeeView { employee }))
}

/// PATCH /employees/{id}
#[tracing::instrument(skip(state, employee))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(employee_id): Path<i64>,
    Json(employee): Json<NewEmployee>,
) -> Result<Success<EmployeeView>, ApiError> {
    let employee = state
        .db
        .employees()
        .update(branch_id, employee_id, &employee)
        .await?;
    Ok(Success::new("Employee updated successfully", EmployeeView { employee }))
}

/// DELETE /employees/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(employee_id): Path<i64>,
) -> Result<Success<Empty>, ApiError> {
    state.db.employees().delete(branch_id, employee_id).await?;
    Ok(Success::message("Employee deleted successfully"))
}

/// POST /employees/salaries
#[tracing::instrument(skip(state, payment))]
pub async fn record_salary(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(payment): Json<SalaryPayment>,
) -> Result<(StatusCode, Json<Success<PayrollCreated>>), ApiError> {
    let created = state.db.employees().record_salary(branch_id, &payment).await?;
    Ok(Success::new(
        "Salary paid successfully",
        PayrollCreated {
            entry_id: created.id,
            memo_no: created.memo_no,
        },
    )
    .with_status(StatusCode::CREATED))
}

/// PATCH /employees/salaries/{memo_no}
#[tracing::instrument(skip(state, payment))]
pub async fn update_salary(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(memo_no): Path<String>,
    Json(payment): Json<SalaryPayment>,
) -> Result<Success<Empty>, ApiError> {
    state
        .db
        .employees()
        .update_salary(branch_id, &memo_no, &payment)
        .await?;
    Ok(Success::message("Salary updated successfully"))
}

/// POST /employees/worker-progress
#[tracing::instrument(skip(state, progress))]
pub async fn record_worker_progress(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(progress): Json<WorkerProgress>,
) -> Result<(StatusCode, Json<Success<PayrollCreated>>), ApiError> {
    let created = state
        .db
        .employees()
        .record_worker_progress(branch_id, &progress)
        .await?;
    Ok(Success::new(
        "Worker progress recorded successfully",
        PayrollCreated {
            entry_id: created.id,
            memo_no: created.memo_no,
        },
    )
    .with_status(StatusCode::CREATED))
}

/// PATCH /employees/worker-progress/{memo_no}
#[tracing::instrument(skip(state, progress))]
pub async fn update_worker_progress(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(memo_no): Path<String>,
    Json(progress): Json<WorkerProgress>,
) -> Result<Success<Empty>, ApiError> {
    state
        .db
        .employees()
        .update_worker_progress(branch_id, &memo_no, &progress)
        .await?;
    Ok(Success::message("Worker progress updated successfully"))
}

/// GET /employees/payroll/{memo_no}
#[tracing::instrument(skip(state))]
pub async fn payroll_entry(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(memo_no): Path<String>,
) -> Result<Success<PayrollView>, ApiError> {
    let entry = state
        .db
        .employees()
        .payroll_entry(branch_id, &memo_no)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Payroll entry not found: {memo_no}")))?;
    Ok(Success::new("Payroll entry retrieved successfully", PayrollView { entry }))
}
