//! Account endpoints.

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;

use branchbook_core::Account;

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::Success;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AccountList {
    pub accounts: Vec<Account>,
}

/// GET /accounts
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
) -> Result<Success<AccountList>, ApiError> {
    let accounts = state.db.accounts().list(branch_id).await?;
    Ok(Success::new("Accounts retrieved successfully", AccountList { accounts }))
}
