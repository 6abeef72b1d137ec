//! Ledger endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use branchbook_core::TransactionType;
use branchbook_db::{LedgerLine, LedgerTypeSummary, TransactionQuery};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::Success;
use crate::routes::{date_range, page_request, ListParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TransactionParams {
    #[serde(alias = "pageIndex")]
    pub page: Option<i64>,
    #[serde(alias = "pageLength")]
    pub limit: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Exact ledger type name, e.g. `Payment` or `Advance Payment`.
    pub transaction_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionList {
    pub transactions: Vec<LedgerLine>,
    pub total_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TransactionSummary {
    pub summary: Vec<LedgerTypeSummary>,
}

/// GET /transactions
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<TransactionParams>,
) -> Result<Success<TransactionList>, ApiError> {
    let transaction_type = match params.transaction_type.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<TransactionType>()?),
    };
    let query = TransactionQuery {
        branch_id,
        range: date_range(&params.start_date, &params.end_date)?,
        transaction_type,
        page: page_request(&state, params.page, params.limit),
    };
    let page = state.db.ledger().list(&query).await?;
    Ok(Success::new(
        "Transactions retrieved successfully",
        TransactionList {
            transactions: page.rows,
            total_count: page.total_count,
        },
    ))
}

/// GET /transactions/summary
#[tracing::instrument(skip(state))]
pub async fn summary(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<ListParams>,
) -> Result<Success<TransactionSummary>, ApiError> {
    let summary = state.db.ledger().summary(branch_id, params.range()?).await?;
    Ok(Success::new(
        "Transaction summary retrieved successfully",
        TransactionSummary { summary },
    ))
}
