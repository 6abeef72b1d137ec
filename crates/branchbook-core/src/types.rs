//! # Domain Types
//!
//! Core domain types used throughout Branchbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Business events (write side)         Rollups (mutated by deltas)       │
//! │  ┌─────────────────┐                  ┌─────────────────┐               │
//! │  │ Order           │──┐               │ TopSheet        │ branch × day  │
//! │  │  + OrderItem    │  │  side         ├─────────────────┤               │
//! │  │  + OrderTxn     │  │  effects      │ EmployeeProgress│ employee × day│
//! │  ├─────────────────┤  ├──────────────►├─────────────────┤               │
//! │  │ Sale            │  │               │ Account balance │               │
//! │  ├─────────────────┤  │               ├─────────────────┤               │
//! │  │ Purchase        │──┘               │ Customer due    │               │
//! │  └─────────────────┘                  └─────────────────┘               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  LedgerEntry: (from: EntityRef) ──amount──► (to: EntityRef)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every row has an integer `id` assigned by the database and most carry a
//! branch-scoped business key, the memo number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Account Type
// =============================================================================

/// Whether a payment account holds cash or a bank balance.
///
/// Decides which TopSheet column (`cash` or `bank`) a received payment
/// lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Cash,
    Bank,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "cash",
            AccountType::Bank => "bank",
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Order state machine.
///
/// ```text
/// pending ──update──► pending
/// pending ──deliver (due or items left)──► partial
/// {pending, partial} ──deliver (nothing left)──► delivered
/// ```
///
/// `Cancelled` and `Checkout` are valid stored values that reports count, but
/// no lifecycle operation moves an order into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Partial,
    Delivered,
    Cancelled,
    Checkout,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Partial => "partial",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Checkout => "checkout",
        }
    }

    /// Statuses that still accept deliveries.
    pub fn accepts_delivery(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Partial)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "partial" => Ok(OrderStatus::Partial),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "checkout" => Ok(OrderStatus::Checkout),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: ["pending", "partial", "delivered", "cancelled", "checkout", "all"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// A sale is delivered on creation; a returned sale is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Delivered,
    Returned,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Delivered => "delivered",
            SaleStatus::Returned => "returned",
        }
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Kind of money movement recorded in the ledger and in order/sale
/// transaction lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum TransactionType {
    #[serde(rename = "Advance Payment")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Advance Payment"))]
    AdvancePayment,
    Payment,
    Refund,
    Adjustment,
    Salary,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::AdvancePayment => "Advance Payment",
            TransactionType::Payment => "Payment",
            TransactionType::Refund => "Refund",
            TransactionType::Adjustment => "Adjustment",
            TransactionType::Salary => "Salary",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Advance Payment" => Ok(TransactionType::AdvancePayment),
            "Payment" => Ok(TransactionType::Payment),
            "Refund" => Ok(TransactionType::Refund),
            "Adjustment" => Ok(TransactionType::Adjustment),
            "Salary" => Ok(TransactionType::Salary),
            _ => Err(ValidationError::NotAllowed {
                field: "transaction_type".to_string(),
                allowed: ["Advance Payment", "Payment", "Refund", "Adjustment", "Salary"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Ledger Parties
// =============================================================================

/// Persisted tag of an [`EntityRef`]; also the name of the table the id
/// points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Accounts,
    Branches,
    Customers,
    Employees,
    Suppliers,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Accounts => "accounts",
            EntityType::Branches => "branches",
            EntityType::Customers => "customers",
            EntityType::Employees => "employees",
            EntityType::Suppliers => "suppliers",
        }
    }
}

/// One side of a ledger entry.
///
/// Stored as an `(entity_id, entity_type)` column pair; in memory it is a
/// closed enum so a ledger entry can never point at an unknown kind of party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Account(i64),
    /// The branch owner; source of opening balances.
    Branch(i64),
    Customer(i64),
    Employee(i64),
    Supplier(i64),
}

impl EntityRef {
    pub fn id(&self) -> i64 {
        match *self {
            EntityRef::Account(id)
            | EntityRef::Branch(id)
            | EntityRef::Customer(id)
            | EntityRef::Employee(id)
            | EntityRef::Supplier(id) => id,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityRef::Account(_) => EntityType::Accounts,
            EntityRef::Branch(_) => EntityType::Branches,
            EntityRef::Customer(_) => EntityType::Customers,
            EntityRef::Employee(_) => EntityType::Employees,
            EntityRef::Supplier(_) => EntityType::Suppliers,
        }
    }

    pub fn from_parts(entity_type: EntityType, id: i64) -> Self {
        match entity_type {
            EntityType::Accounts => EntityRef::Account(id),
            EntityType::Branches => EntityRef::Branch(id),
            EntityType::Customers => EntityRef::Customer(id),
            EntityType::Employees => EntityRef::Employee(id),
            EntityType::Suppliers => EntityRef::Supplier(id),
        }
    }
}

// =============================================================================
// Directory Records
// =============================================================================

/// A branch-scoped money pool.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Account {
    pub id: i64,
    pub branch_id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub current_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub branch_id: i64,
    pub name: String,
    pub mobile: String,
    /// Unpaid balance across every order and sale of this customer.
    pub due_amount: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeRole {
    Chairman,
    Manager,
    Salesperson,
    Worker,
}

impl EmployeeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::Chairman => "chairman",
            EmployeeRole::Manager => "manager",
            EmployeeRole::Salesperson => "salesperson",
            EmployeeRole::Worker => "worker",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: i64,
    pub branch_id: i64,
    pub name: String,
    pub role: EmployeeRole,
    pub mobile: String,
    pub base_salary: Money,
}

/// Input for hiring an employee.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewEmployee {
    pub name: String,
    pub role: EmployeeRole,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub base_salary: Money,
}

/// Name and mobile of a customer or supplier, for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PartyDetails {
    pub name: String,
    #[serde(default)]
    pub mobile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: i64,
    pub branch_id: i64,
    pub name: String,
    pub mobile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub branch_id: i64,
    pub product_name: String,
    /// Units currently in stock. May go negative when a sale outruns a
    /// restock; the shop floor reconciles physically.
    pub quantity: i64,
}

// =============================================================================
// Line Items
// =============================================================================

/// One product line of an order or sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: i64,
    pub quantity: i64,
    pub subtotal: Money,
}

/// Sums item quantities, saturating at `i64::MAX`.
pub fn total_items(items: &[LineItem]) -> i64 {
    items.iter().fold(0, |acc, i| acc.saturating_add(i.quantity))
}

// =============================================================================
// Trade Footprint
// =============================================================================

/// The fields of an order or sale that drive its side effects.
///
/// Reverting an event uses the footprint of the *stored* record and
/// re-applying uses the footprint of the *new* one, so a change of date,
/// salesperson, customer or account moves the effect to the right rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFootprint {
    pub branch_id: i64,
    pub memo_no: String,
    pub date: NaiveDate,
    pub salesperson_id: i64,
    pub customer_id: i64,
    pub payment_account_id: i64,
    pub total_items: i64,
    pub total_amount: Money,
    pub received_amount: Money,
}

impl TradeFootprint {
    /// Amount the customer still owes for this event.
    pub fn due(&self) -> Money {
        self.total_amount - self.received_amount
    }
}

// =============================================================================
// Order
// =============================================================================

/// Input for creating or replacing an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    /// Generated as `MMDD` + 4 characters when absent.
    pub memo_no: Option<String>,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    pub salesperson_id: i64,
    pub customer_id: i64,
    /// Only required when money is received.
    #[serde(default)]
    pub payment_account_id: i64,
    pub total_amount: Money,
    pub received_amount: Money,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
}

impl NewOrder {
    pub fn total_items(&self) -> i64 {
        total_items(&self.items)
    }

    pub fn footprint(&self, branch_id: i64, memo_no: &str) -> TradeFootprint {
        TradeFootprint {
            branch_id,
            memo_no: memo_no.to_string(),
            date: self.order_date,
            salesperson_id: self.salesperson_id,
            customer_id: self.customer_id,
            payment_account_id: self.payment_account_id,
            total_items: self.total_items(),
            total_amount: self.total_amount,
            received_amount: self.received_amount,
        }
    }
}

/// A stored order header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub branch_id: i64,
    pub memo_no: String,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    pub salesperson_id: i64,
    pub customer_id: i64,
    pub total_items: i64,
    pub delivered_items: i64,
    pub total_amount: Money,
    /// 0 when no money was received.
    pub payment_account_id: i64,
    pub received_amount: Money,
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// A delivery and/or payment event against an open order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDelivery {
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    /// Employee who handed the goods over.
    pub delivered_by: i64,
    pub quantity_delivered: i64,
    pub amount: Money,
    /// Only required when money is received.
    #[serde(default)]
    pub payment_account_id: i64,
}

/// Header values an order takes after a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub received_amount: Money,
    pub delivered_items: i64,
    pub status: OrderStatus,
    pub due_after: Money,
    pub remaining_items: i64,
}

impl Order {
    pub fn footprint(&self) -> TradeFootprint {
        TradeFootprint {
            branch_id: self.branch_id,
            memo_no: self.memo_no.clone(),
            date: self.order_date,
            salesperson_id: self.salesperson_id,
            customer_id: self.customer_id,
            payment_account_id: self.payment_account_id,
            total_items: self.total_items,
            total_amount: self.total_amount,
            received_amount: self.received_amount,
        }
    }

    pub fn due(&self) -> Money {
        self.total_amount - self.received_amount
    }

    /// Updates are only legal while the order is pending.
    pub fn ensure_editable(&self) -> CoreResult<()> {
        if self.status != OrderStatus::Pending {
            return Err(CoreError::OrderNotPending {
                memo_no: self.memo_no.clone(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// Computes the header after `delivery`, or rejects it.
    ///
    /// ## Rules
    /// - `due = total - received - amount` must stay `>= 0`
    /// - `remaining = total_items - delivered - quantity` must stay `>= 0`
    /// - status becomes `delivered` only when both reach zero
    ///
    /// ## Example
    /// ```rust
    /// use branchbook_core::{Money, Order, OrderDelivery, OrderStatus};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    /// let order = Order {
    ///     id: 1, branch_id: 1, memo_no: "0314ABCD".into(),
    ///     order_date: date, delivery_date: None,
    ///     salesperson_id: 1, customer_id: 1,
    ///     total_items: 2, delivered_items: 0,
    ///     total_amount: Money::from_cents(10_000), payment_account_id: 1,
    ///     received_amount: Money::from_cents(4_000),
    ///     status: OrderStatus::Pending, notes: None,
    /// };
    /// let plan = order.plan_delivery(&OrderDelivery {
    ///     transaction_date: date, delivered_by: 1,
    ///     quantity_delivered: 2, amount: Money::from_cents(6_000),
    ///     payment_account_id: 1,
    /// }).unwrap();
    /// assert_eq!(plan.status, OrderStatus::Delivered);
    /// ```
    pub fn plan_delivery(&self, delivery: &OrderDelivery) -> CoreResult<DeliveryPlan> {
        if !self.status.accepts_delivery() {
            return Err(CoreError::OrderClosed {
                memo_no: self.memo_no.clone(),
                status: self.status.to_string(),
            });
        }
        if delivery.quantity_delivered < 0 {
            return Err(ValidationError::negative("quantity_delivered").into());
        }
        if delivery.amount.is_negative() {
            return Err(ValidationError::negative("amount").into());
        }

        let due_after = self.due() - delivery.amount;
        if due_after.is_negative() {
            return Err(CoreError::DeliveryExceedsDue {
                due: self.due(),
                amount: delivery.amount,
            });
        }

        let remaining_items =
            self.total_items - self.delivered_items - delivery.quantity_delivered;
        if remaining_items < 0 {
            return Err(CoreError::DeliveryExceedsItems {
                remaining: self.total_items - self.delivered_items,
                requested: delivery.quantity_delivered,
            });
        }

        let status = if due_after.is_positive() || remaining_items > 0 {
            OrderStatus::Partial
        } else {
            OrderStatus::Delivered
        };

        Ok(DeliveryPlan {
            received_amount: self.received_amount + delivery.amount,
            delivered_items: self.delivered_items + delivery.quantity_delivered,
            status,
            due_after,
            remaining_items,
        })
    }
}

/// A payment or delivery recorded against an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderTransaction {
    pub transaction_id: i64,
    pub order_id: i64,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    pub memo_no: String,
    /// 0 when no money was received.
    pub payment_account_id: i64,
    pub delivered_by: Option<i64>,
    pub quantity_delivered: i64,
    pub amount: Money,
    pub transaction_type: TransactionType,
}

// =============================================================================
// Sale
// =============================================================================

/// Input for creating or replacing a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub memo_no: Option<String>,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub salesperson_id: i64,
    pub customer_id: i64,
    /// Only required when money is received.
    #[serde(default)]
    pub payment_account_id: i64,
    pub total_amount: Money,
    pub received_amount: Money,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
}

impl NewSale {
    pub fn total_items(&self) -> i64 {
        total_items(&self.items)
    }

    pub fn footprint(&self, branch_id: i64, memo_no: &str) -> TradeFootprint {
        TradeFootprint {
            branch_id,
            memo_no: memo_no.to_string(),
            date: self.sale_date,
            salesperson_id: self.salesperson_id,
            customer_id: self.customer_id,
            payment_account_id: self.payment_account_id,
            total_items: self.total_items(),
            total_amount: self.total_amount,
            received_amount: self.received_amount,
        }
    }
}

/// A stored sale header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub branch_id: i64,
    pub memo_no: String,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub salesperson_id: i64,
    pub customer_id: i64,
    pub total_items: i64,
    pub total_amount: Money,
    /// 0 when no money was received.
    pub payment_account_id: i64,
    pub received_amount: Money,
    pub status: SaleStatus,
    pub notes: Option<String>,
}

impl Sale {
    pub fn footprint(&self) -> TradeFootprint {
        TradeFootprint {
            branch_id: self.branch_id,
            memo_no: self.memo_no.clone(),
            date: self.sale_date,
            salesperson_id: self.salesperson_id,
            customer_id: self.customer_id,
            payment_account_id: self.payment_account_id,
            total_items: self.total_items,
            total_amount: self.total_amount,
            received_amount: self.received_amount,
        }
    }

    pub fn ensure_editable(&self) -> CoreResult<()> {
        if self.status == SaleStatus::Returned {
            return Err(CoreError::SaleReturned {
                memo_no: self.memo_no.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleTransaction {
    pub transaction_id: i64,
    pub sale_id: i64,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    pub memo_no: String,
    pub payment_account_id: i64,
    pub amount: Money,
    pub transaction_type: TransactionType,
}

// =============================================================================
// Purchase
// =============================================================================

/// Material purchase input. Always paid in full from the branch cash account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchase {
    pub memo_no: Option<String>,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
    pub supplier_id: i64,
    pub total_amount: Money,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: i64,
    pub branch_id: i64,
    pub memo_no: String,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
    pub supplier_id: i64,
    pub total_amount: Money,
    pub notes: Option<String>,
}

// =============================================================================
// Ledger
// =============================================================================

/// A ledger entry to append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub transaction_date: NaiveDate,
    /// Generated when absent.
    pub memo_no: Option<String>,
    pub branch_id: i64,
    pub from: EntityRef,
    pub to: EntityRef,
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub notes: Option<String>,
}

/// A stored ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub transaction_date: NaiveDate,
    pub memo_no: String,
    pub branch_id: i64,
    pub from: EntityRef,
    pub to: EntityRef,
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub notes: Option<String>,
}

impl LedgerEntry {
    /// Signed effect of this entry on `account_id`'s balance: money flowing
    /// into the account is positive, money leaving it negative.
    pub fn effect_on_account(&self, account_id: i64) -> Money {
        let mut effect = Money::zero();
        if self.to == EntityRef::Account(account_id) {
            effect += self.amount;
        }
        if self.from == EntityRef::Account(account_id) {
            effect -= self.amount;
        }
        effect
    }
}

// =============================================================================
// Rollups
// =============================================================================

/// Daily branch summary, one row per `(branch_id, sheet_date)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopSheet {
    #[ts(as = "String")]
    pub sheet_date: NaiveDate,
    pub branch_id: i64,
    pub expense: Money,
    pub cash: Money,
    pub bank: Money,
    pub order_count: i64,
    pub delivery: i64,
    pub cancelled: i64,
    pub ready_made: i64,
    pub sales_amount: Money,
}

impl TopSheet {
    /// `cash + bank`, derived at read time.
    pub fn total_amount(&self) -> Money {
        self.cash + self.bank
    }

    /// `total_amount - expense`, derived at read time.
    pub fn balance(&self) -> Money {
        self.total_amount() - self.expense
    }
}

/// Daily per-employee sheet, one row per `(employee_id, sheet_date)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct EmployeeProgress {
    #[ts(as = "String")]
    pub sheet_date: NaiveDate,
    pub branch_id: i64,
    pub employee_id: i64,
    pub sale_amount: Money,
    pub sale_return_amount: Money,
    pub order_count: i64,
    pub production_units: i64,
    pub overtime_hours: f64,
    pub advance_payment: Money,
    pub salary: Money,
}

// =============================================================================
// Payroll
// =============================================================================

/// A salary payment to an employee from the branch cash account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalaryPayment {
    /// Generated when absent; needed again to update the payment.
    pub memo_no: Option<String>,
    pub employee_id: i64,
    #[ts(as = "String")]
    pub sheet_date: NaiveDate,
    pub amount: Money,
    pub notes: Option<String>,
}

/// A worker's daily production entry, optionally with an advance paid from
/// the branch cash account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WorkerProgress {
    pub memo_no: Option<String>,
    pub employee_id: i64,
    #[ts(as = "String")]
    pub sheet_date: NaiveDate,
    pub production_units: i64,
    pub overtime_hours: f64,
    pub advance_payment: Money,
}

/// Which payroll event a [`PayrollEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PayrollKind {
    Salary,
    Work,
}

/// Stored payroll record; the source an update reverts from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PayrollEntry {
    pub id: i64,
    pub memo_no: String,
    pub branch_id: i64,
    pub employee_id: i64,
    #[ts(as = "String")]
    pub sheet_date: NaiveDate,
    pub kind: PayrollKind,
    pub amount: Money,
    pub production_units: i64,
    pub overtime_hours: f64,
    pub advance_payment: Money,
    pub notes: Option<String>,
}

impl PayrollEntry {
    /// Cash leaving the branch for this entry.
    pub fn cash_out(&self) -> Money {
        match self.kind {
            PayrollKind::Salary => self.amount,
            PayrollKind::Work => self.advance_payment,
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockItem {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockRequest {
    pub memo_no: Option<String>,
    #[ts(as = "String")]
    pub stock_date: NaiveDate,
    pub items: Vec<RestockItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn pending_order() -> Order {
        Order {
            id: 7,
            branch_id: 1,
            memo_no: "0314K2Q9".to_string(),
            order_date: date(),
            delivery_date: None,
            salesperson_id: 3,
            customer_id: 4,
            total_items: 2,
            delivered_items: 0,
            total_amount: Money::from_cents(10_000),
            payment_account_id: 1,
            received_amount: Money::from_cents(4_000),
            status: OrderStatus::Pending,
            notes: None,
        }
    }

    fn delivery(qty: i64, amount: i64) -> OrderDelivery {
        OrderDelivery {
            transaction_date: date(),
            delivered_by: 3,
            quantity_delivered: qty,
            amount: Money::from_cents(amount),
            payment_account_id: 1,
        }
    }

    #[test]
    fn test_full_delivery_marks_delivered() {
        let plan = pending_order().plan_delivery(&delivery(2, 6_000)).unwrap();
        assert_eq!(plan.status, OrderStatus::Delivered);
        assert_eq!(plan.received_amount.cents(), 10_000);
        assert_eq!(plan.delivered_items, 2);
        assert!(plan.due_after.is_zero());
    }

    #[test]
    fn test_payment_without_goods_is_partial() {
        let plan = pending_order().plan_delivery(&delivery(0, 6_000)).unwrap();
        assert_eq!(plan.status, OrderStatus::Partial);
        assert_eq!(plan.remaining_items, 2);
    }

    #[test]
    fn test_goods_without_full_payment_is_partial() {
        let plan = pending_order().plan_delivery(&delivery(2, 1_000)).unwrap();
        assert_eq!(plan.status, OrderStatus::Partial);
        assert_eq!(plan.due_after.cents(), 5_000);
    }

    #[test]
    fn test_overpayment_rejected() {
        let err = pending_order().plan_delivery(&delivery(0, 6_001)).unwrap_err();
        assert!(matches!(err, CoreError::DeliveryExceedsDue { .. }));
    }

    #[test]
    fn test_over_delivery_rejected() {
        let err = pending_order().plan_delivery(&delivery(3, 0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DeliveryExceedsItems {
                remaining: 2,
                requested: 3
            }
        ));
    }

    #[test]
    fn test_delivered_order_is_closed() {
        let mut order = pending_order();
        order.status = OrderStatus::Delivered;
        assert!(matches!(
            order.plan_delivery(&delivery(0, 0)),
            Err(CoreError::OrderClosed { .. })
        ));
        assert!(matches!(
            order.ensure_editable(),
            Err(CoreError::OrderNotPending { .. })
        ));
    }

    #[test]
    fn test_entity_ref_round_trips_through_parts() {
        let party = EntityRef::Supplier(9);
        assert_eq!(party.entity_type(), EntityType::Suppliers);
        assert_eq!(EntityRef::from_parts(party.entity_type(), party.id()), party);
    }

    #[test]
    fn test_ledger_effect_on_account() {
        let entry = LedgerEntry {
            id: 1,
            transaction_date: date(),
            memo_no: "ORDER-0314K2Q9".to_string(),
            branch_id: 1,
            from: EntityRef::Customer(4),
            to: EntityRef::Account(1),
            amount: Money::from_cents(4_000),
            transaction_type: TransactionType::AdvancePayment,
            notes: None,
        };
        assert_eq!(entry.effect_on_account(1).cents(), 4_000);
        assert_eq!(entry.effect_on_account(2).cents(), 0);
    }

    #[test]
    fn test_transaction_type_serde_names() {
        let json = serde_json::to_string(&TransactionType::AdvancePayment).unwrap();
        assert_eq!(json, "\"Advance Payment\"");
        assert_eq!(
            "Salary".parse::<TransactionType>().unwrap(),
            TransactionType::Salary
        );
    }

    #[test]
    fn test_top_sheet_derived_fields() {
        let sheet = TopSheet {
            sheet_date: date(),
            branch_id: 1,
            expense: Money::from_cents(2_500),
            cash: Money::from_cents(4_000),
            bank: Money::from_cents(1_000),
            order_count: 2,
            delivery: 0,
            cancelled: 0,
            ready_made: 0,
            sales_amount: Money::zero(),
        };
        assert_eq!(sheet.total_amount().cents(), 5_000);
        assert_eq!(sheet.balance().cents(), 2_500);
    }

    #[test]
    fn test_total_items_saturates() {
        let items = vec![
            LineItem {
                product_id: 1,
                quantity: i64::MAX,
                subtotal: Money::zero(),
            },
            LineItem {
                product_id: 2,
                quantity: 1,
                subtotal: Money::zero(),
            },
        ];
        assert_eq!(total_items(&items), i64::MAX);
    }
}
