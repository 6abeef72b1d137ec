//! # Repository Module
//!
//! Database repository implementations for Branchbook.
//!
//! ## Two Kinds of Code Live Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Repositories (pub)                 Transaction helpers (pub(crate))    │
//! │  ──────────────────                 ────────────────────────────────    │
//! │  own a SqlitePool                   take &mut SqliteConnection          │
//! │  open ONE transaction per event     never begin or commit               │
//! │                                                                         │
//! │  OrderRepository::create ──┬──► lock_branch                             │
//! │                            ├──► apply_top_sheet_delta                   │
//! │                            ├──► lock_account / adjust_balance           │
//! │                            ├──► ledger::append                          │
//! │                            ├──► lock_customer / adjust_due              │
//! │                            └──► apply_progress_delta                    │
//! │                                                                         │
//! │  Any helper error → `?` → the Transaction is dropped → ROLLBACK        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`] - create / update / deliver, order reads
//! - [`SaleRepository`] - create / update with stock movement, sale reads
//! - [`PurchaseRepository`] - create / update / delete, purchase report
//! - [`EmployeeRepository`] - employees, salary and worker progress
//! - [`LedgerRepository`] - the transaction log
//! - [`ReportRepository`] - read-only reports over the rollups
//! - [`TopSheetRepository`], [`ProgressRepository`] - direct rollup reads
//! - [`AccountRepository`], [`CustomerRepository`], [`SupplierRepository`],
//!   [`ProductRepository`], [`BranchRepository`] - directory records

pub mod account;
pub mod branch;
pub mod customer;
pub mod employee;
pub mod ledger;
pub mod order;
pub mod product;
pub mod progress;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod supplier;
pub mod top_sheet;

pub use account::AccountRepository;
pub use branch::BranchRepository;
pub use customer::CustomerRepository;
pub use employee::EmployeeRepository;
pub use ledger::LedgerRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use progress::ProgressRepository;
pub use purchase::PurchaseRepository;
pub use report::ReportRepository;
pub use sale::SaleRepository;
pub use supplier::SupplierRepository;
pub use top_sheet::TopSheetRepository;

use serde::Serialize;

/// Identity of a newly recorded order, sale, purchase or payroll entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    pub id: i64,
    pub memo_no: String,
}
