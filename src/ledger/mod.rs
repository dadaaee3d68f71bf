//! Ledger module: account management and the balance-mutating transaction log

pub mod account;
pub mod core;
pub mod transaction;

pub use account::*;
pub use core::*;
pub use transaction::*;
