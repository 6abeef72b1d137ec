//! # branchbook-db: Database Layer for Branchbook
//!
//! Every business event (order, delivery, sale, purchase, salary) runs here
//! as ONE SQLite transaction that writes the event row and all the
//! aggregates it touches.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Branchbook Data Flow                             │
//! │                                                                         │
//! │  POST /api/v1/orders  (X-Branch-ID: 3)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  branchbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_initial_ │  │   │
//! │  │   │ WAL, FK on    │    │ PurchaseRepo  │    │   schema.sql │  │   │
//! │  │   │ busy_timeout  │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  orders · top_sheet · employees_progress · transactions ·       │   │
//! │  │  accounts · customers · products                  (SQLite)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Lifecycle managers, ledger, rollups and reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use branchbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("branchbook.db")).await?;
//!
//! let created = db.orders().create(branch_id, &new_order).await?;
//! let sheet = db.top_sheets().get(branch_id, new_order.order_date).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerQuery;
pub use repository::employee::EmployeeQuery;
pub use repository::ledger::{LedgerLine, LedgerTypeSummary, TransactionQuery};
pub use repository::order::{OrderDetails, OrderQuery, OrderSummary};
pub use repository::product::{StockEntry, StockTotals};
pub use repository::purchase::{PurchaseLine, PurchaseQuery, PurchaseTotals};
pub use repository::report::{
    BranchReportRow, BranchTotals, OrderOverview, SalaryRow, SalaryTotals,
    SalespersonProgressRow, SalespersonTotals, StatusSummary, WorkerProgressRow,
};
pub use repository::sale::{SaleDetails, SaleQuery, SaleSummary};
pub use repository::supplier::SupplierQuery;
pub use repository::{
    AccountRepository, BranchRepository, Created, CustomerRepository, EmployeeRepository,
    LedgerRepository, OrderRepository, ProductRepository, ProgressRepository,
    PurchaseRepository, ReportRepository, SaleRepository, SupplierRepository,
    TopSheetRepository,
};
