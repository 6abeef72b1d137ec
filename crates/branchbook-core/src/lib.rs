//! # branchbook-core: Pure Business Logic for Branchbook
//!
//! Branchbook is a multi-branch ERP backend. Every order, sale, delivery and
//! purchase it records fans out into several denormalized aggregates that
//! must stay consistent with each other. This crate holds the rules for that
//! fan-out as pure functions; `branchbook-db` executes them inside one
//! database transaction per business event.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Branchbook Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    X-Branch-ID ──► JSON body ──► repository call ──► envelope   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ branchbook-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   delta   │  │   memo    │  │ validation│  │   │
//! │  │   │  Order    │  │ TopSheet  │  │  MMDD +   │  │  amounts  │  │   │
//! │  │   │  Sale     │  │ Progress  │  │  4 chars  │  │  items    │  │   │
//! │  │   │  EntityRef│  │  (signed) │  │           │  │  dates    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                branchbook-db (Database Layer)                   │   │
//! │  │        SQLite transactions, delta upserts, ledger log           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Order, Sale, Purchase, Account, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`delta`] - Signed deltas for the TopSheet and EmployeeProgress rollups
//! - [`memo`] - Memo number generation and ledger memo tags
//! - [`query`] - Pagination, date ranges and report periods
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are minor units (i64), so a
//!    `+x` delta followed by `-x` restores the exact prior value
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use branchbook_core::delta::TopSheetDelta;
//! use branchbook_core::{AccountType, Money};
//!
//! // An order of 2 items with 40.00 paid up front in cash
//! let delta = TopSheetDelta::order_placed(2, Money::from_cents(4000), AccountType::Cash);
//! assert_eq!(delta.order_count, 2);
//! assert_eq!(delta.cash.cents(), 4000);
//!
//! // Reversal is the negated delta
//! let undo = -delta;
//! assert_eq!(undo.cash.cents(), -4000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod delta;
pub mod error;
pub mod memo;
pub mod money;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use branchbook_core::Money` instead of
// `use branchbook_core::money::Money`

pub use delta::{ProgressDelta, TopSheetDelta};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use query::{DateRange, Page, PageRequest, Report, ReportPeriod};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default page size for list and report queries.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Largest page a caller may request in one call.
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Maximum length of a search term.
pub const MAX_SEARCH_LEN: usize = 100;

/// Maximum length of a caller-supplied memo number.
pub const MAX_MEMO_LEN: usize = 32;

/// Maximum length of a party or account name.
pub const MAX_NAME_LEN: usize = 100;
