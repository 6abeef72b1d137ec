//! Material purchase endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use branchbook_core::{NewPurchase, Purchase};
use branchbook_db::{PurchaseLine, PurchaseQuery, PurchaseTotals};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::{Empty, Success};
use crate::routes::ListParams;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PurchaseCreated {
    pub purchase_id: i64,
    pub memo_no: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseReport {
    pub purchases: Vec<PurchaseLine>,
    pub total_count: i64,
    pub totals: PurchaseTotals,
}

#[derive(Debug, Serialize)]
pub struct PurchaseView {
    pub purchase: Purchase,
}

/// POST /purchases
#[tracing::instrument(skip(state, purchase))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(purchase): Json<NewPurchase>,
) -> Result<(StatusCode, Json<Success<PurchaseCreated>>), ApiError> {
    let created = state.db.purchases().create(branch_id, &purchase).await?;
    Ok(Success::new(
        "Purchase added successfully",
        PurchaseCreated {
            purchase_id: created.id,
            memo_no: created.memo_no,
        },
    )
    .with_status(StatusCode::CREATED))
}

/// GET /purchases?start_date&end_date&search&page(1-based)&limit
#[tracing::instrument(skip(state))]
pub async fn report(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<PurchaseReport>, ApiError> {
    let query = PurchaseQuery {
        range: params.range()?,
        search: params.search()?,
        page: params.page_one_based(&state),
    };
    let report = state.db.purchases().report(branch_id, &query).await?;
    Ok(Success::new(
        "Purchases retrieved successfully",
        PurchaseReport {
            purchases: report.rows,
            total_count: report.total_count,
            totals: report.totals,
        },
    ))
}

/// GET /purchases/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(purchase_id): Path<i64>,
) -> Result<Success<PurchaseView>, ApiError> {
    let purchase = state
        .db
        .purchases()
        .get(branch_id, purchase_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Purchase not found: {purchase_id}")))?;
    Ok(Success::new("Purchase retrieved successfully", PurchaseView { purchase }))
}

/// PATCH /purchases/{id}
#[tracing::instrument(skip(state, purchase))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(purchase_id): Path<i64>,
    Json(purchase): Json<NewPurchase>,
) -> Result<Success<Empty>, ApiError> {
    state
        .db
        .purchases()
        .update(branch_id, purchase_id, &purchase)
        .await?;
    Ok(Success::message("Purchase updated successfully"))
}

/// DELETE /purchases/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(purchase_id): Path<i64>,
) -> Result<Success<Empty>, ApiError> {
    state.db.purchases().delete(branch_id, purchase_id).await?;
    Ok(Success::message("Purchase deleted successfully"))
}
