//! Inventory endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use branchbook_core::{Product, RestockRequest};
use branchbook_db::{StockEntry, StockTotals};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::Success;
use crate::routes::ListParams;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct Restocked {
    pub memo_no: String,
}

#[derive(Debug, Serialize)]
pub struct StockReport {
    pub entries: Vec<StockEntry>,
    pub total_count: i64,
    pub totals: StockTotals,
}

/// GET /products
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
) -> Result<Success<ProductList>, ApiError> {
    let products = state.db.products().list(branch_id).await?;
    Ok(Success::new("Products retrieved successfully", ProductList { products }))
}

/// POST /products/restock
#[tracing::instrument(skip(state, request))]
pub async fn restock(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(request): Json<RestockRequest>,
) -> Result<(StatusCode, Json<Success<Restocked>>), ApiError> {
    let memo_no = state.db.products().restock(branch_id, &request).await?;
    Ok(Success::new("Products restocked successfully", Restocked { memo_no })
        .with_status(StatusCode::CREATED))
}

/// GET /products/stock-report
#[tracing::instrument(skip(state))]
pub async fn stock_report(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<StockReport>, ApiError> {
    let report = state
        .db
        .products()
        .stock_report(branch_id, params.range()?, params.page(&state))
        .await?;
    Ok(Success::new(
        "Stock report retrieved successfully",
        StockReport {
            entries: report.rows,
            total_count: report.total_count,
            totals: report.totals,
        },
    ))
}
