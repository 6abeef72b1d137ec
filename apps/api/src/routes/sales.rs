//! Sale endpoints. Same shape as orders, without deliveries.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use branchbook_core::NewSale;
use branchbook_db::{SaleDetails, SaleQuery, SaleSummary};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::{Empty, Success};
use crate::routes::ListParams;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SaleCreated {
    pub sale_id: i64,
    pub memo_no: String,
}

#[derive(Debug, Serialize)]
pub struct SaleList {
    pub sales: Vec<SaleSummary>,
    pub total_count: i64,
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct SaleView {
    pub sale: SaleDetails,
}

/// POST /sales
#[tracing::instrument(skip(state, sale))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(sale): Json<NewSale>,
) -> Result<(StatusCode, Json<Success<SaleCreated>>), ApiError> {
    let created = state.db.sales().create(branch_id, &sale).await?;
    Ok(Success::new(
        "Sale added successfully",
        SaleCreated {
            sale_id: created.id,
            memo_no: created.memo_no,
        },
    )
    .with_status(StatusCode::CREATED))
}

/// GET /sales
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<SaleList>, ApiError> {
    let query = SaleQuery {
        search: params.search()?,
        page: params.page(&state),
    };
    let page = state.db.sales().list(branch_id, &query).await?;
    Ok(Success::new(
        "Sales retrieved successfully",
        SaleList {
            sales: page.rows,
            total_count: page.total_count,
            page: query.page.page,
        },
    ))
}

/// GET /sales/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(sale_id): Path<i64>,
) -> Result<Success<SaleView>, ApiError> {
    let sale = state.db.sales().get_details(branch_id, sale_id).await?;
    Ok(Success::new("Sale retrieved successfully", SaleView { sale }))
}

/// PATCH /sales/{id}
#[tracing::instrument(skip(state, sale))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(sale_id): Path<i64>,
    Json(sale): Json<NewSale>,
) -> Result<Success<Empty>, ApiError> {
    state.db.sales().update(branch_id, sale_id, &sale).await?;
    Ok(Success::message("Sale updated successfully"))
}
