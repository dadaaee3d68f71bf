//! # Bookkeeping Core
//!
//! A small-business bookkeeping library covering cash accounts, categorized
//! income/expense transactions, inventory with weighted-average costing, debt
//! tracking, and sales/purchase workflows that keep all of those consistent.
//!
//! ## Features
//!
//! - **Accounts and transactions**: Per-account running balances maintained
//!   incrementally as transactions are recorded, edited, and deleted
//! - **Inventory costing**: Weighted-average cost per stock item, with exact
//!   reversal when purchases are edited or deleted
//! - **Debt tracking**: Receivables and payables with partial payments and a
//!   derived unpaid/partial/paid status
//! - **Sales and purchase workflows**: Invoice-numbered orders and purchases
//!   that settle as transactions (paid) or debts (unpaid), never both
//! - **Reporting**: Daily cashflow, debt summaries, contact statements, and
//!   stock valuation
//! - **Storage abstraction**: Database-agnostic design with trait-based
//!   storage; an in-memory backend ships for tests and prototyping
//!
//! ## Quick Start
//!
//! ```rust
//! use bookkeeping_core::{Ledger, MemoryStorage};
//! use bigdecimal::BigDecimal;
//! use uuid::Uuid;
//!
//! # async fn demo() -> bookkeeping_core::LedgerResult<()> {
//! let mut ledger = Ledger::new(MemoryStorage::new());
//! let owner = Uuid::new_v4();
//! let account = ledger
//!     .create_account(owner, "Cash".to_string(), BigDecimal::from(1000))
//!     .await?;
//! assert_eq!(account.balance, BigDecimal::from(1000));
//! # Ok(())
//! # }
//! ```

pub mod debt;
pub mod inventory;
pub mod ledger;
pub mod reports;
pub mod traits;
pub mod types;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use debt::{DebtDraft, DebtManager, PaymentDraft};
pub use inventory::StockManager;
pub use ledger::*;
pub use reports::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStorage;
pub use workflow::{
    LineItemDraft, OrderDraft, OrderManager, PurchaseDraft, PurchaseManager,
};
