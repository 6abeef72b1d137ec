//! # Validation Module
//!
//! Input validation for every write path.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP transport (apps/api)                                    │
//! │  ├── X-Branch-ID header present and non-zero                           │
//! │  └── JSON deserialization (types, dates)                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE, before any transaction is opened                │
//! │  ├── at least one line item                                            │
//! │  └── 0 <= received <= total                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (memo_no, branch_id)                                       │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because layer 2 runs before `BEGIN`, a rejected request performs zero
//! storage mutations.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    LineItem, NewEmployee, NewOrder, NewPurchase, NewSale, RestockRequest, SalaryPayment,
    WorkerProgress,
};
use crate::{MAX_NAME_LEN, MAX_SEARCH_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifiers
// =============================================================================

/// Rejects zero or negative ids.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

pub fn validate_branch_id(branch_id: i64) -> ValidationResult<()> {
    validate_id("branch_id", branch_id)
}

/// Validates a display name and returns it trimmed.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::required(field));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(name.to_string())
}

// =============================================================================
// Amounts
// =============================================================================

/// Validates the amount pair of an order or sale.
///
/// ## Rules
/// - `total_amount >= 0`
/// - `0 <= received_amount <= total_amount`
///
/// ## Example
/// ```rust
/// use branchbook_core::validation::validate_trade_amounts;
/// use branchbook_core::Money;
///
/// let total = Money::from_cents(10_000);
/// assert!(validate_trade_amounts(total, Money::from_cents(4_000)).is_ok());
/// assert!(validate_trade_amounts(total, Money::from_cents(10_001)).is_err());
/// assert!(validate_trade_amounts(total, Money::from_cents(-1)).is_err());
/// ```
pub fn validate_trade_amounts(total: Money, received: Money) -> ValidationResult<()> {
    if total.is_negative() {
        return Err(ValidationError::negative("total_amount"));
    }
    if received.is_negative() || received > total {
        return Err(ValidationError::OutOfRange {
            field: "received_amount".to_string(),
            min: 0,
            max: total.cents(),
        });
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

// =============================================================================
// Line Items
// =============================================================================

/// Validates order/sale line items.
///
/// ## Rules
/// - At least one item
/// - Every product id set, every quantity positive
/// - Total quantity fits in an `i64`
/// - No negative subtotal
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    let mut total: i64 = 0;
    for item in items {
        validate_id("product_id", item.product_id)?;
        if item.quantity <= 0 {
            return Err(ValidationError::must_be_positive("quantity"));
        }
        total = total
            .checked_add(item.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: i64::MAX,
            })?;
        validate_non_negative("subtotal", item.subtotal)?;
    }
    Ok(())
}

// =============================================================================
// Business Events
// =============================================================================

pub fn validate_new_order(order: &NewOrder) -> ValidationResult<()> {
    validate_line_items(&order.items)?;
    validate_trade_amounts(order.total_amount, order.received_amount)?;
    validate_id("salesperson_id", order.salesperson_id)?;
    validate_id("customer_id", order.customer_id)?;
    if order.received_amount.is_positive() {
        validate_id("payment_account_id", order.payment_account_id)?;
    }
    if let Some(delivery_date) = order.delivery_date {
        if delivery_date < order.order_date {
            return Err(ValidationError::invalid_format(
                "delivery_date",
                "must not be before order_date",
            ));
        }
    }
    Ok(())
}

pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    validate_line_items(&sale.items)?;
    validate_trade_amounts(sale.total_amount, sale.received_amount)?;
    validate_id("salesperson_id", sale.salesperson_id)?;
    validate_id("customer_id", sale.customer_id)?;
    if sale.received_amount.is_positive() {
        validate_id("payment_account_id", sale.payment_account_id)?;
    }
    Ok(())
}

pub fn validate_new_purchase(purchase: &NewPurchase) -> ValidationResult<()> {
    validate_id("supplier_id", purchase.supplier_id)?;
    validate_non_negative("total_amount", purchase.total_amount)
}

/// Validates a hire or an employee edit; returns the trimmed name.
pub fn validate_new_employee(employee: &NewEmployee) -> ValidationResult<String> {
    let name = validate_name("name", &employee.name)?;
    validate_non_negative("base_salary", employee.base_salary)?;
    Ok(name)
}

pub fn validate_salary_payment(payment: &SalaryPayment) -> ValidationResult<()> {
    validate_id("employee_id", payment.employee_id)?;
    if !payment.amount.is_positive() {
        return Err(ValidationError::must_be_positive("amount"));
    }
    Ok(())
}

pub fn validate_worker_progress(progress: &WorkerProgress) -> ValidationResult<()> {
    validate_id("employee_id", progress.employee_id)?;
    if progress.production_units < 0 {
        return Err(ValidationError::negative("production_units"));
    }
    if !progress.overtime_hours.is_finite() || progress.overtime_hours < 0.0 {
        return Err(ValidationError::negative("overtime_hours"));
    }
    validate_non_negative("advance_payment", progress.advance_payment)
}

pub fn validate_restock(request: &RestockRequest) -> ValidationResult<()> {
    if request.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    for item in &request.items {
        validate_id("product_id", item.product_id)?;
        if item.quantity <= 0 {
            return Err(ValidationError::must_be_positive("quantity"));
        }
    }
    Ok(())
}

// =============================================================================
// Search
// =============================================================================

/// Validates a search term.
///
/// ## Returns
/// The trimmed term, or `None` when blank (no filtering).
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };
    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }
    Ok(Some(query.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
