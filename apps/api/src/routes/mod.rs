//! Route handlers, one module per resource.
//!
//! Handlers stay thin: extract the branch, decode input, make one
//! repository call, wrap the result in [`Success`](crate::response::Success).

pub mod accounts;
pub mod customers;
pub mod employees;
pub mod health;
pub mod orders;
pub mod products;
pub mod purchases;
pub mod reports;
pub mod sales;
pub mod suppliers;
pub mod transactions;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use branchbook_core::validation::validate_search_query;
use branchbook_core::{DateRange, PageRequest, ValidationError};

use crate::AppState;

/// Query parameters shared by list and report endpoints.
///
/// Endpoints with extra filters declare their own struct with the same
/// fields; query strings do not survive `#[serde(flatten)]` for numbers.
/// `pageIndex`/`pageLength` are accepted for older clients.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(alias = "pageIndex")]
    pub page: Option<i64>,
    #[serde(alias = "pageLength")]
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ListParams {
    pub fn page(&self, state: &AppState) -> PageRequest {
        page_request(state, self.page, self.limit)
    }

    pub fn page_one_based(&self, state: &AppState) -> PageRequest {
        page_request_one_based(state, self.page, self.limit)
    }

    pub fn range(&self) -> Result<DateRange, ValidationError> {
        date_range(&self.start_date, &self.end_date)
    }

    pub fn search(&self) -> Result<Option<String>, ValidationError> {
        validate_search_query(self.search.as_deref())
    }
}

/// 0-based page with the configured default limit.
pub(crate) fn page_request(state: &AppState, page: Option<i64>, limit: Option<i64>) -> PageRequest {
    PageRequest::new(page, Some(limit.unwrap_or(state.config.default_page_limit)))
}

/// 1-based page with the configured default limit.
pub(crate) fn page_request_one_based(
    state: &AppState,
    page: Option<i64>,
    limit: Option<i64>,
) -> PageRequest {
    PageRequest::one_based(page, Some(limit.unwrap_or(state.config.default_page_limit)))
}

/// Inclusive date range; a missing bound is today.
pub(crate) fn date_range(
    start: &Option<String>,
    end: &Option<String>,
) -> Result<DateRange, ValidationError> {
    DateRange::parse(start.as_deref(), end.as_deref(), today())
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
