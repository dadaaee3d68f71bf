//! Storage abstraction for the bookkeeping core

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::*;

/// Storage port for the bookkeeping system
///
/// This trait lets the core work with any backend (PostgreSQL, MySQL, SQLite,
/// in-memory, etc.). Lookups by id are owner-agnostic; the managers compare
/// the stored `owner` field against the requesting owner and reject
/// mismatches, so implementations do not enforce tenancy themselves.
///
/// Atomicity contract: the core performs all of its validation reads before
/// its first write, and persistent implementations are expected to wrap each
/// workflow call (order/purchase create/update/delete, payment) in a single
/// database transaction so a failure rolls the whole operation back.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    // Accounts
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()>;
    async fn get_account(&self, id: Uuid) -> LedgerResult<Option<Account>>;
    async fn list_accounts(&self, owner: Uuid) -> LedgerResult<Vec<Account>>;
    async fn update_account(&mut self, account: &Account) -> LedgerResult<()>;
    async fn delete_account(&mut self, id: Uuid) -> LedgerResult<()>;

    // Categories
    async fn save_category(&mut self, category: &Category) -> LedgerResult<()>;
    async fn get_category(&self, id: Uuid) -> LedgerResult<Option<Category>>;
    async fn list_categories(&self, owner: Uuid) -> LedgerResult<Vec<Category>>;
    async fn update_category(&mut self, category: &Category) -> LedgerResult<()>;
    async fn delete_category(&mut self, id: Uuid) -> LedgerResult<()>;

    // Contacts
    async fn save_contact(&mut self, contact: &Contact) -> LedgerResult<()>;
    async fn get_contact(&self, id: Uuid) -> LedgerResult<Option<Contact>>;
    async fn list_contacts(&self, owner: Uuid) -> LedgerResult<Vec<Contact>>;
    async fn update_contact(&mut self, contact: &Contact) -> LedgerResult<()>;
    async fn delete_contact(&mut self, id: Uuid) -> LedgerResult<()>;

    // Catalogs (pure reference data)
    async fn save_item(&mut self, item: &Item) -> LedgerResult<()>;
    async fn get_item(&self, id: Uuid) -> LedgerResult<Option<Item>>;
    async fn list_items(&self, owner: Uuid) -> LedgerResult<Vec<Item>>;
    async fn save_supplier_item(&mut self, item: &SupplierItem) -> LedgerResult<()>;
    async fn get_supplier_item(&self, id: Uuid) -> LedgerResult<Option<SupplierItem>>;
    async fn list_supplier_items(&self, owner: Uuid) -> LedgerResult<Vec<SupplierItem>>;

    // Stock and its append-only mutation log
    async fn save_stock(&mut self, stock: &Stock) -> LedgerResult<()>;
    async fn get_stock(&self, id: Uuid) -> LedgerResult<Option<Stock>>;
    async fn list_stocks(&self, owner: Uuid) -> LedgerResult<Vec<Stock>>;
    async fn update_stock(&mut self, stock: &Stock) -> LedgerResult<()>;
    async fn delete_stock(&mut self, id: Uuid) -> LedgerResult<()>;
    async fn append_stock_mutation(&mut self, mutation: &StockMutation) -> LedgerResult<()>;
    async fn list_stock_mutations(
        &self,
        owner: Uuid,
        stock_id: Uuid,
    ) -> LedgerResult<Vec<StockMutation>>;

    // Transactions
    async fn save_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()>;
    async fn get_transaction(&self, id: Uuid) -> LedgerResult<Option<Transaction>>;
    async fn update_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()>;
    async fn delete_transaction(&mut self, id: Uuid) -> LedgerResult<()>;
    async fn list_transactions(
        &self,
        owner: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>>;
    async fn list_account_transactions(
        &self,
        owner: Uuid,
        account_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>>;
    async fn list_order_transactions(
        &self,
        owner: Uuid,
        order_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>>;
    async fn list_purchase_transactions(
        &self,
        owner: Uuid,
        purchase_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>>;
    async fn list_debt_transactions(
        &self,
        owner: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>>;

    // Debts
    async fn save_debt(&mut self, debt: &Debt) -> LedgerResult<()>;
    async fn get_debt(&self, id: Uuid) -> LedgerResult<Option<Debt>>;
    async fn update_debt(&mut self, debt: &Debt) -> LedgerResult<()>;
    async fn delete_debt(&mut self, id: Uuid) -> LedgerResult<()>;
    async fn list_debts(&self, owner: Uuid) -> LedgerResult<Vec<Debt>>;
    async fn find_order_debt(&self, owner: Uuid, order_id: Uuid) -> LedgerResult<Option<Debt>>;
    async fn find_purchase_debt(
        &self,
        owner: Uuid,
        purchase_id: Uuid,
    ) -> LedgerResult<Option<Debt>>;

    // Orders (line items live on the header and cascade with it)
    async fn save_order(&mut self, order: &Order) -> LedgerResult<()>;
    async fn get_order(&self, id: Uuid) -> LedgerResult<Option<Order>>;
    async fn update_order(&mut self, order: &Order) -> LedgerResult<()>;
    async fn delete_order(&mut self, id: Uuid) -> LedgerResult<()>;
    async fn list_orders(&self, owner: Uuid) -> LedgerResult<Vec<Order>>;
    async fn list_contact_orders(&self, owner: Uuid, contact_id: Uuid) -> LedgerResult<Vec<Order>>;
    /// Count of orders this owner created on the given calendar day; seeds
    /// the invoice-number sequence
    async fn count_orders_created_on(&self, owner: Uuid, date: NaiveDate) -> LedgerResult<u64>;
    /// Invoice numbers are globally unique, across owners
    async fn invoice_number_exists(&self, invoice_number: &str) -> LedgerResult<bool>;

    // Purchases
    async fn save_purchase(&mut self, purchase: &Purchase) -> LedgerResult<()>;
    async fn get_purchase(&self, id: Uuid) -> LedgerResult<Option<Purchase>>;
    async fn update_purchase(&mut self, purchase: &Purchase) -> LedgerResult<()>;
    async fn delete_purchase(&mut self, id: Uuid) -> LedgerResult<()>;
    async fn list_purchases(&self, owner: Uuid) -> LedgerResult<Vec<Purchase>>;
    async fn count_purchases_created_on(&self, owner: Uuid, date: NaiveDate) -> LedgerResult<u64>;
    async fn reference_number_exists(&self, reference_number: &str) -> LedgerResult<bool>;
}
