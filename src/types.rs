//! Core types and data structures for the bookkeeping system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a cash transaction against an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money flowing into the account
    Income,
    /// Money flowing out of the account
    Expense,
}

/// Category label kind; mirrors [`TransactionKind`] but is purely descriptive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    Income,
    Expense,
}

/// Role of a contact as a counterparty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    Customer,
    Supplier,
    Both,
}

/// Side of an outstanding obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtKind {
    /// We owe the counterparty (purchase side)
    Payable,
    /// The counterparty owes us (sales side)
    Receivable,
}

/// Settlement state shared by debts, orders, and purchases
///
/// The state is fully determined by how much of the original amount is still
/// outstanding; see [`Debt::recompute_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

/// Origin of a stock quantity/cost change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockMutationKind {
    /// Manual inward adjustment carrying a unit cost
    In,
    /// Outward movement: manual adjustment or an order-driven decrement
    Out,
    /// Inflow (or its reversal) driven by a purchase line item
    Purchase,
}

/// Cash-holding bucket with a running balance
///
/// The balance is maintained incrementally: every transaction create, update,
/// or delete applies or reverses its signed effect here. It is never
/// recomputed from the transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub balance: BigDecimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new account with an opening balance
    pub fn new(owner: Uuid, name: String, balance: BigDecimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            balance,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the signed effect of a transaction to the balance
    pub fn apply_effect(&mut self, kind: TransactionKind, amount: &BigDecimal) {
        match kind {
            TransactionKind::Income => self.balance += amount,
            TransactionKind::Expense => self.balance -= amount,
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Undo the signed effect of a transaction on the balance
    pub fn reverse_effect(&mut self, kind: TransactionKind, amount: &BigDecimal) {
        match kind {
            TransactionKind::Income => self.balance -= amount,
            TransactionKind::Expense => self.balance += amount,
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// Income/expense label attached to transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub kind: CategoryKind,
}

impl Category {
    pub fn new(owner: Uuid, name: String, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            kind,
        }
    }
}

/// Customer/supplier counterparty for orders, purchases, and debts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub kind: ContactKind,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Contact {
    pub fn new(owner: Uuid, name: String, kind: ContactKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            kind,
            phone: None,
            address: None,
        }
    }
}

/// Sales catalog entry used to default order line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub unit: String,
    pub tracks_stock: bool,
}

impl Item {
    pub fn new(owner: Uuid, name: String, price: BigDecimal, unit: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            price,
            unit,
            tracks_stock: false,
        }
    }
}

/// Purchase catalog entry used to default purchase line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierItem {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub unit: String,
    pub tracks_stock: bool,
}

impl SupplierItem {
    pub fn new(owner: Uuid, name: String, price: BigDecimal, unit: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            price,
            unit,
            tracks_stock: false,
        }
    }
}

/// Inventory SKU carrying a weighted-average cost basis
///
/// `qty` and `avg_cost` are reachable only through the stock valuation engine
/// (purchase inflows, order outflows, manual adjustments). The user-facing
/// edit touches name/unit/selling_price only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub unit: String,
    pub qty: BigDecimal,
    pub avg_cost: BigDecimal,
    pub selling_price: BigDecimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Stock {
    pub fn new(owner: Uuid, name: String, unit: String, selling_price: BigDecimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            unit,
            qty: BigDecimal::from(0),
            avg_cost: BigDecimal::from(0),
            selling_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Asset value at cost basis (qty × avg_cost)
    pub fn cost_value(&self) -> BigDecimal {
        &self.qty * &self.avg_cost
    }

    /// Asset value at market (qty × selling_price)
    pub fn market_value(&self) -> BigDecimal {
        &self.qty * &self.selling_price
    }
}

/// Append-only audit record of one stock quantity/cost change
///
/// `current_qty` and `current_avg_cost` are post-mutation snapshots. Rows
/// accumulate; they are never edited or deleted when the triggering operation
/// is edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMutation {
    pub id: Uuid,
    pub owner: Uuid,
    pub stock_id: Uuid,
    pub kind: StockMutationKind,
    /// Signed quantity change (+ inward, − outward/reversal)
    pub qty_delta: BigDecimal,
    pub current_qty: BigDecimal,
    pub current_avg_cost: BigDecimal,
    pub created_at: NaiveDateTime,
}

/// Outstanding payable/receivable with a shrinking remaining balance
///
/// A debt carrying an `order_id` or `purchase_id` is system-managed: it may
/// only change through its owning order/purchase or the payment operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub owner: Uuid,
    pub contact_id: Uuid,
    pub order_id: Option<Uuid>,
    pub purchase_id: Option<Uuid>,
    pub kind: DebtKind,
    /// Original obligation
    pub amount: BigDecimal,
    /// Still outstanding, clamped at zero
    pub remaining: BigDecimal,
    pub status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Debt {
    /// Create a fresh, fully outstanding debt
    pub fn new(owner: Uuid, contact_id: Uuid, kind: DebtKind, amount: BigDecimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            owner,
            contact_id,
            order_id: None,
            purchase_id: None,
            kind,
            remaining: amount.clone(),
            amount,
            status: PaymentStatus::Unpaid,
            due_date: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this debt is managed by an order or purchase
    pub fn is_linked(&self) -> bool {
        self.order_id.is_some() || self.purchase_id.is_some()
    }

    /// Amount already collected against the original obligation
    pub fn paid_amount(&self) -> BigDecimal {
        &self.amount - &self.remaining
    }

    /// Derive status from remaining, clamping remaining at zero
    pub fn recompute_status(&mut self) {
        let zero = BigDecimal::from(0);
        if self.remaining <= zero {
            self.remaining = zero;
            self.status = PaymentStatus::Paid;
        } else if self.remaining < self.amount {
            self.status = PaymentStatus::Partial;
        } else {
            self.status = PaymentStatus::Unpaid;
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// Categorized cash movement against exactly one account
///
/// At most one of `order_id`, `purchase_id`, `debt_id` is set, describing the
/// transaction's origin; all unset means a standalone entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner: Uuid,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub purchase_id: Option<Uuid>,
    pub debt_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount: BigDecimal,
    pub date: NaiveDate,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Create a standalone transaction
    pub fn new(
        owner: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount: BigDecimal,
        date: NaiveDate,
        description: String,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            owner,
            account_id,
            category_id: None,
            order_id: None,
            purchase_id: None,
            debt_id: None,
            kind,
            amount,
            date,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Frozen line of an order: decoupled from the catalog so historical records
/// survive later price changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_name: String,
    pub qty: BigDecimal,
    pub price: BigDecimal,
    pub subtotal: BigDecimal,
    pub item_id: Option<Uuid>,
    pub stock_id: Option<Uuid>,
}

impl OrderItem {
    pub fn new(
        item_name: String,
        qty: BigDecimal,
        price: BigDecimal,
        item_id: Option<Uuid>,
        stock_id: Option<Uuid>,
    ) -> Self {
        let subtotal = &qty * &price;
        Self {
            item_name,
            qty,
            price,
            subtotal,
            item_id,
            stock_id,
        }
    }
}

/// Sales aggregate: header plus inline line items
///
/// Line items live on the header, so deleting the header drops them with it;
/// cleanup of linked transactions and debts is explicit and one row at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub owner: Uuid,
    pub contact_id: Option<Uuid>,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub items: Vec<OrderItem>,
    pub grand_total: BigDecimal,
    pub status: PaymentStatus,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Frozen line of a purchase; a `stock_id` makes it drive stock valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub item_name: String,
    pub qty: BigDecimal,
    pub price: BigDecimal,
    pub subtotal: BigDecimal,
    pub supplier_item_id: Option<Uuid>,
    pub stock_id: Option<Uuid>,
}

impl PurchaseItem {
    pub fn new(
        item_name: String,
        qty: BigDecimal,
        price: BigDecimal,
        supplier_item_id: Option<Uuid>,
        stock_id: Option<Uuid>,
    ) -> Self {
        let subtotal = &qty * &price;
        Self {
            item_name,
            qty,
            price,
            subtotal,
            supplier_item_id,
            stock_id,
        }
    }
}

/// Procurement aggregate mirroring [`Order`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub owner: Uuid,
    pub contact_id: Option<Uuid>,
    /// Originating sales order, for cost-of-goods reporting
    pub order_id: Option<Uuid>,
    pub reference_number: String,
    pub date: NaiveDate,
    pub items: Vec<PurchaseItem>,
    pub grand_total: BigDecimal,
    pub status: PaymentStatus,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Errors surfaced by the bookkeeping core
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Operation not permitted: {0}")]
    InvalidOperation(String),
    #[error("Access denied")]
    Unauthorized,
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),
    #[error("Contact not found: {0}")]
    ContactNotFound(Uuid),
    #[error("Stock not found: {0}")]
    StockNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Debt not found: {0}")]
    DebtNotFound(Uuid),
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),
    #[error("Purchase not found: {0}")]
    PurchaseNotFound(Uuid),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
