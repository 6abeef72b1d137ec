//! Supplier directory endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use branchbook_core::{PartyDetails, Supplier};
use branchbook_db::{DbError, SupplierQuery};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::{Empty, Success};
use crate::routes::ListParams;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SupplierList {
    pub suppliers: Vec<Supplier>,
    pub total_count: i64,
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct SupplierView {
    pub supplier: Supplier,
}

/// POST /suppliers
#[tracing::instrument(skip(state, details))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(details): Json<PartyDetails>,
) -> Result<(StatusCode, Json<Success<SupplierView>>), ApiError> {
    let supplier = state
        .db
        .suppliers()
        .create(branch_id, &details.name, &details.mobile)
        .await?;
    Ok(Success::new("Supplier added successfully", SupplierView { supplier })
        .with_status(StatusCode::CREATED))
}

/// GET /suppliers
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<SupplierList>, ApiError> {
    let query = SupplierQuery {
        search: params.search()?,
        page: params.page(&state),
    };
    let page = state.db.suppliers().list(branch_id, &query).await?;
    Ok(Success::new(
        "Suppliers retrieved successfully",
        SupplierList {
            suppliers: page.rows,
            total_count: page.total_count,
            page: query.page.page,
        },
    ))
}

/// GET /suppliers/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(supplier_id): Path<i64>,
) -> Result<Success<SupplierView>, ApiError> {
    let supplier = state
        .db
        .suppliers()
        .get_in_branch(branch_id, supplier_id)
        .await?
        .ok_or_else(|| DbError::not_found("Supplier", supplier_id))?;
    Ok(Success::new("Supplier retrieved successfully", SupplierView { supplier }))
}

/// PATCH /suppliers/{id}
#[tracing::instrument(skip(state, details))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(supplier_id): Path<i64>,
    Json(details): Json<PartyDetails>,
) -> Result<Success<SupplierView>, ApiError> {
    let supplier = state
        .db
        .suppliers()
        .update(branch_id, supplier_id, &details)
        .await?;
    Ok(Success::new("Supplier updated successfully", SupplierView { supplier }))
}

/// DELETE /suppliers/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(supplier_id): Path<i64>,
) -> Result<Success<Empty>, ApiError> {
    state.db.suppliers().delete(branch_id, supplier_id).await?;
    Ok(Success::message("Supplier deleted successfully"))
}
