//! # Aggregate Deltas
//!
//! Signed deltas for the two daily rollups. The database never overwrites a
//! rollup row; it adds one of these to it (creating the row on first use).
//!
//! ## Why Deltas?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create order       TopSheet(b1, 03-14) += { order_count: 2, cash: 40 } │
//! │  update order       TopSheet(b1, 03-14) += { order_count:-2, cash:-40 } │
//! │                     TopSheet(b1, 03-15) += { order_count: 3, cash: 50 } │
//! │                                                                         │
//! │  apply(d) then apply(-d) == never applied                               │
//! │  apply(a) then apply(b)  == apply(b) then apply(a)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The constructors below name every business event that touches a rollup,
//! so the lifecycle code never builds a delta field by field.

use std::ops::Neg;

use crate::money::Money;
use crate::types::{AccountType, TradeFootprint};

// =============================================================================
// TopSheet Delta
// =============================================================================

/// Signed change to one `(branch_id, sheet_date)` TopSheet row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopSheetDelta {
    pub expense: Money,
    pub cash: Money,
    pub bank: Money,
    pub order_count: i64,
    pub delivery: i64,
    pub cancelled: i64,
    pub ready_made: i64,
    pub sales_amount: Money,
}

impl TopSheetDelta {
    /// Money received into an account of `account_type`.
    pub fn received(amount: Money, account_type: AccountType) -> Self {
        match account_type {
            AccountType::Cash => TopSheetDelta {
                cash: amount,
                ..Default::default()
            },
            AccountType::Bank => TopSheetDelta {
                bank: amount,
                ..Default::default()
            },
        }
    }

    /// Money spent by the branch (purchases, salaries, advances).
    pub fn expense(amount: Money) -> Self {
        TopSheetDelta {
            expense: amount,
            ..Default::default()
        }
    }

    /// An order booked with `total_items` and an optional advance.
    pub fn order_placed(total_items: i64, received: Money, account_type: AccountType) -> Self {
        TopSheetDelta {
            order_count: total_items,
            ..Self::received(received, account_type)
        }
    }

    /// A delivery of `quantity` items with an optional payment.
    pub fn delivery(quantity: i64, amount: Money, account_type: AccountType) -> Self {
        TopSheetDelta {
            delivery: quantity,
            ..Self::received(amount, account_type)
        }
    }

    /// A ready-made sale: goods leave stock immediately.
    pub fn sale_made(footprint: &TradeFootprint, account_type: AccountType) -> Self {
        TopSheetDelta {
            sales_amount: footprint.total_amount,
            ready_made: footprint.total_items,
            ..Self::received(footprint.received_amount, account_type)
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == TopSheetDelta::default()
    }
}

impl Neg for TopSheetDelta {
    type Output = Self;

    fn neg(self) -> Self {
        TopSheetDelta {
            expense: -self.expense,
            cash: -self.cash,
            bank: -self.bank,
            order_count: -self.order_count,
            delivery: -self.delivery,
            cancelled: -self.cancelled,
            ready_made: -self.ready_made,
            sales_amount: -self.sales_amount,
        }
    }
}

// =============================================================================
// EmployeeProgress Delta
// =============================================================================

/// Signed change to one `(employee_id, sheet_date)` progress row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressDelta {
    pub sale_amount: Money,
    pub sale_return_amount: Money,
    pub order_count: i64,
    pub production_units: i64,
    pub overtime_hours: f64,
    pub advance_payment: Money,
    pub salary: Money,
}

impl ProgressDelta {
    /// Salesperson credit for booking an order.
    pub fn order_booked(footprint: &TradeFootprint) -> Self {
        ProgressDelta {
            order_count: footprint.total_items,
            sale_amount: footprint.total_amount,
            ..Default::default()
        }
    }

    /// Salesperson credit for a completed sale. Sales carry no order count.
    pub fn sale_made(footprint: &TradeFootprint) -> Self {
        ProgressDelta {
            sale_amount: footprint.total_amount,
            ..Default::default()
        }
    }

    pub fn salary(amount: Money) -> Self {
        ProgressDelta {
            salary: amount,
            ..Default::default()
        }
    }

    /// A worker's daily output.
    pub fn work_logged(production_units: i64, overtime_hours: f64, advance: Money) -> Self {
        ProgressDelta {
            production_units,
            overtime_hours,
            advance_payment: advance,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == ProgressDelta::default()
    }
}

impl Neg for ProgressDelta {
    type Output = Self;

    fn neg(self) -> Self {
        ProgressDelta {
            sale_amount: -self.sale_amount,
            sale_return_amount: -self.sale_return_amount,
            order_count: -self.order_count,
            production_units: -self.production_units,
            overtime_hours: -self.overtime_hours,
            advance_payment: -self.advance_payment,
            salary: -self.salary,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
