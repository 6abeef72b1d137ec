//! # branchbook-api: HTTP Transport for Branchbook
//!
//! REST endpoints over `branchbook-db`. Every business route is scoped to
//! one branch by the `X-Branch-ID` header.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Client ──► TraceLayer ──► CORS ──► Router (/api/v1)                   │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                           BranchId extractor (400 if missing)           │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                           handler ──► repository (one transaction)      │
//! │                                        │                                │
//! │                                        ▼                                │
//! │               Success envelope  or  ApiError envelope + status          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use branchbook_db::Database;

use crate::config::ApiConfig;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState { db, config }
    }
}

/// Creates the application router with all routes under `/api/v1`.
pub fn create_app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/ping", get(routes::health::ping))
        // Orders
        .route("/orders", post(routes::orders::create).get(routes::orders::list))
        .route("/orders/{id}", get(routes::orders::get).patch(routes::orders::update))
        .route("/orders/{id}/deliveries", post(routes::orders::deliver))
        // Sales
        .route("/sales", post(routes::sales::create).get(routes::sales::list))
        .route("/sales/{id}", get(routes::sales::get).patch(routes::sales::update))
        // Purchases
        .route(
            "/purchases",
            post(routes::purchases::create).get(routes::purchases::report),
        )
        .route(
            "/purchases/{id}",
            get(routes::purchases::get)
                .patch(routes::purchases::update)
                .delete(routes::purchases::delete),
        )
        // Inventory
        .route("/products", get(routes::products::list))
        .route("/products/restock", post(routes::products::restock))
        .route("/products/stock-report", get(routes::products::stock_report))
        // Accounts and ledger
        .route("/accounts", get(routes::accounts::list))
        .route("/transactions", get(routes::transactions::list))
        .route("/transactions/summary", get(routes::transactions::summary))
        // Reports
        .route("/reports/orders/overview", get(routes::reports::order_overview))
        .route("/reports/branch", get(routes::reports::branch))
        .route("/reports/employee/progress", get(routes::reports::salesperson_progress))
        .route("/reports/worker/progress", get(routes::reports::worker_progress))
        .route("/reports/employee/salaries", get(routes::reports::salaries))
        .route("/reports/top-sheet", get(routes::reports::top_sheet))
        // Directories
        .route("/customers", get(routes::customers::list).post(routes::customers::create))
        .route("/customers/with-due", get(routes::customers::with_due))
        .route("/customers/filter", get(routes::customers::filter))
        .route(
            "/customers/{id}",
            get(routes::customers::get).patch(routes::customers::update),
        )
        .route("/suppliers", get(routes::suppliers::list).post(routes::suppliers::create))
        .route(
            "/suppliers/{id}",
            get(routes::suppliers::get)
                .patch(routes::suppliers::update)
                .delete(routes::suppliers::delete),
        )
        .route("/employees", get(routes::employees::list).post(routes::employees::create))
        .route(
            "/employees/{id}",
            get(routes::employees::get)
                .patch(routes::employees::update)
                .delete(routes::employees::delete),
        )
        // Payroll
        .route("/employees/salaries", post(routes::employees::record_salary))
        .route("/employees/salaries/{memo_no}", patch(routes::employees::update_salary))
        .route(
            "/employees/worker-progress",
            post(routes::employees::record_worker_progress),
        )
        .route(
            "/employees/worker-progress/{memo_no}",
            patch(routes::employees::update_worker_progress),
        )
        .route("/employees/payroll/{memo_no}", get(routes::employees::payroll_entry))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
