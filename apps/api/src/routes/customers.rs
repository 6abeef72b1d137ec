//! Customer directory endpoints.
//!
//! `due_amount` is read-only here; orders, sales and deliveries move it.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use branchbook_core::validation::validate_search_query;
use branchbook_core::{Customer, PartyDetails};
use branchbook_db::{CustomerQuery, DbError};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::Success;
use crate::routes::ListParams;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerList {
    pub customers: Vec<Customer>,
    pub total_count: i64,
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct CustomerMatches {
    pub customers: Vec<Customer>,
}

#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub customer: Customer,
}

/// POST /customers
#[tracing::instrument(skip(state, details))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(details): Json<PartyDetails>,
) -> Result<(StatusCode, Json<Success<CustomerView>>), ApiError> {
    let customer = state
        .db
        .customers()
        .create(branch_id, &details.name, &details.mobile)
        .await?;
    Ok(Success::new("Customer added successfully", CustomerView { customer })
        .with_status(StatusCode::CREATED))
}

/// GET /customers
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<CustomerList>, ApiError> {
    let query = CustomerQuery {
        search: params.search()?,
        page: params.page(&state),
    };
    let page = state.db.customers().list(branch_id, &query).await?;
    Ok(Success::new(
        "Customers retrieved successfully",
        CustomerList {
            customers: page.rows,
            total_count: page.total_count,
            page: query.page.page,
        },
    ))
}

/// GET /customers/with-due
#[tracing::instrument(skip(state))]
pub async fn with_due(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<CustomerList>, ApiError> {
    let request = params.page(&state);
    let page = state.db.customers().with_due(branch_id, request).await?;
    Ok(Success::new(
        "Customers with due retrieved successfully",
        CustomerList {
            customers: page.rows,
            total_count: page.total_count,
            page: request.page,
        },
    ))
}

/// GET /customers/filter?name=
#[tracing::instrument(skip(state))]
pub async fn filter(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<FilterParams>,
) -> Result<Success<CustomerMatches>, ApiError> {
    let customers = match validate_search_query(params.name.as_deref())? {
        Some(name) => state.db.customers().filter_by_name(branch_id, &name).await?,
        None => Vec::new(),
    };
    Ok(Success::new("Customers retrieved successfully", CustomerMatches { customers }))
}

/// GET /customers/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(customer_id): Path<i64>,
) -> Result<Success<CustomerView>, ApiError> {
    let customer = state
        .db
        .customers()
        .get_in_branch(branch_id, customer_id)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", customer_id))?;
    Ok(Success::new("Customer retrieved successfully", CustomerView { customer }))
}

/// PATCH /customers/{id}
#[tracing::instrument(skip(state, details))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(customer_id): Path<i64>,
    Json(details): Json<PartyDetails>,
) -> Result<Success<CustomerView>, ApiError> {
    let customer = state
        .db
        .customers()
        .update(branch_id, customer_id, &details)
        .await?;
    Ok(Success::new("Customer updated successfully", CustomerView { customer }))
}
