//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::traits::LedgerStorage;
use crate::types::*;

/// In-memory storage backed by shared hash maps
///
/// Clones share the same underlying state, which lets the managers each hold
/// a handle to one logical store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
    contacts: Arc<RwLock<HashMap<Uuid, Contact>>>,
    items: Arc<RwLock<HashMap<Uuid, Item>>>,
    supplier_items: Arc<RwLock<HashMap<Uuid, SupplierItem>>>,
    stocks: Arc<RwLock<HashMap<Uuid, Stock>>>,
    stock_mutations: Arc<RwLock<Vec<StockMutation>>>,
    transactions: Arc<RwLock<HashMap<Uuid, Transaction>>>,
    debts: Arc<RwLock<HashMap<Uuid, Debt>>>,
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
    purchases: Arc<RwLock<HashMap<Uuid, Purchase>>>,
}

impl MemoryStorage {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.accounts.write().unwrap().clear();
        self.categories.write().unwrap().clear();
        self.contacts.write().unwrap().clear();
        self.items.write().unwrap().clear();
        self.supplier_items.write().unwrap().clear();
        self.stocks.write().unwrap().clear();
        self.stock_mutations.write().unwrap().clear();
        self.transactions.write().unwrap().clear();
        self.debts.write().unwrap().clear();
        self.orders.write().unwrap().clear();
        self.purchases.write().unwrap().clear();
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()> {
        self.accounts
            .write()
            .unwrap()
            .insert(account.id, account.clone());
        Ok(())
    }

    async fn get_account(&self, id: Uuid) -> LedgerResult<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(&id).cloned())
    }

    async fn list_accounts(&self, owner: Uuid) -> LedgerResult<Vec<Account>> {
        Ok(self
            .accounts
            .read()
            .unwrap()
            .values()
            .filter(|a| a.owner == owner)
            .cloned()
            .collect())
    }

    async fn update_account(&mut self, account: &Account) -> LedgerResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(&account.id) {
            accounts.insert(account.id, account.clone());
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(account.id))
        }
    }

    async fn delete_account(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.accounts.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(id))
        }
    }

    async fn save_category(&mut self, category: &Category) -> LedgerResult<()> {
        self.categories
            .write()
            .unwrap()
            .insert(category.id, category.clone());
        Ok(())
    }

    async fn get_category(&self, id: Uuid) -> LedgerResult<Option<Category>> {
        Ok(self.categories.read().unwrap().get(&id).cloned())
    }

    async fn list_categories(&self, owner: Uuid) -> LedgerResult<Vec<Category>> {
        Ok(self
            .categories
            .read()
            .unwrap()
            .values()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect())
    }

    async fn update_category(&mut self, category: &Category) -> LedgerResult<()> {
        let mut categories = self.categories.write().unwrap();
        if categories.contains_key(&category.id) {
            categories.insert(category.id, category.clone());
            Ok(())
        } else {
            Err(LedgerError::CategoryNotFound(category.id))
        }
    }

    async fn delete_category(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.categories.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::CategoryNotFound(id))
        }
    }

    async fn save_contact(&mut self, contact: &Contact) -> LedgerResult<()> {
        self.contacts
            .write()
            .unwrap()
            .insert(contact.id, contact.clone());
        Ok(())
    }

    async fn get_contact(&self, id: Uuid) -> LedgerResult<Option<Contact>> {
        Ok(self.contacts.read().unwrap().get(&id).cloned())
    }

    async fn list_contacts(&self, owner: Uuid) -> LedgerResult<Vec<Contact>> {
        Ok(self
            .contacts
            .read()
            .unwrap()
            .values()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect())
    }

    async fn update_contact(&mut self, contact: &Contact) -> LedgerResult<()> {
        let mut contacts = self.contacts.write().unwrap();
        if contacts.contains_key(&contact.id) {
            contacts.insert(contact.id, contact.clone());
            Ok(())
        } else {
            Err(LedgerError::ContactNotFound(contact.id))
        }
    }

    async fn delete_contact(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.contacts.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::ContactNotFound(id))
        }
    }

    async fn save_item(&mut self, item: &Item) -> LedgerResult<()> {
        self.items.write().unwrap().insert(item.id, item.clone());
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> LedgerResult<Option<Item>> {
        Ok(self.items.read().unwrap().get(&id).cloned())
    }

    async fn list_items(&self, owner: Uuid) -> LedgerResult<Vec<Item>> {
        Ok(self
            .items
            .read()
            .unwrap()
            .values()
            .filter(|i| i.owner == owner)
            .cloned()
            .collect())
    }

    async fn save_supplier_item(&mut self, item: &SupplierItem) -> LedgerResult<()> {
        self.supplier_items
            .write()
            .unwrap()
            .insert(item.id, item.clone());
        Ok(())
    }

    async fn get_supplier_item(&self, id: Uuid) -> LedgerResult<Option<SupplierItem>> {
        Ok(self.supplier_items.read().unwrap().get(&id).cloned())
    }

    async fn list_supplier_items(&self, owner: Uuid) -> LedgerResult<Vec<SupplierItem>> {
        Ok(self
            .supplier_items
            .read()
            .unwrap()
            .values()
            .filter(|i| i.owner == owner)
            .cloned()
            .collect())
    }

    async fn save_stock(&mut self, stock: &Stock) -> LedgerResult<()> {
        self.stocks.write().unwrap().insert(stock.id, stock.clone());
        Ok(())
    }

    async fn get_stock(&self, id: Uuid) -> LedgerResult<Option<Stock>> {
        Ok(self.stocks.read().unwrap().get(&id).cloned())
    }

    async fn list_stocks(&self, owner: Uuid) -> LedgerResult<Vec<Stock>> {
        Ok(self
            .stocks
            .read()
            .unwrap()
            .values()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect())
    }

    async fn update_stock(&mut self, stock: &Stock) -> LedgerResult<()> {
        let mut stocks = self.stocks.write().unwrap();
        if stocks.contains_key(&stock.id) {
            stocks.insert(stock.id, stock.clone());
            Ok(())
        } else {
            Err(LedgerError::StockNotFound(stock.id))
        }
    }

    async fn delete_stock(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.stocks.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::StockNotFound(id))
        }
    }

    async fn append_stock_mutation(&mut self, mutation: &StockMutation) -> LedgerResult<()> {
        self.stock_mutations.write().unwrap().push(mutation.clone());
        Ok(())
    }

    async fn list_stock_mutations(
        &self,
        owner: Uuid,
        stock_id: Uuid,
    ) -> LedgerResult<Vec<StockMutation>> {
        Ok(self
            .stock_mutations
            .read()
            .unwrap()
            .iter()
            .filter(|m| m.owner == owner && m.stock_id == stock_id)
            .cloned()
            .collect())
    }

    async fn save_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()> {
        self.transactions
            .write()
            .unwrap()
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn get_transaction(&self, id: Uuid) -> LedgerResult<Option<Transaction>> {
        Ok(self.transactions.read().unwrap().get(&id).cloned())
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> LedgerResult<()> {
        let mut transactions = self.transactions.write().unwrap();
        if transactions.contains_key(&transaction.id) {
            transactions.insert(transaction.id, transaction.clone());
            Ok(())
        } else {
            Err(LedgerError::TransactionNotFound(transaction.id))
        }
    }

    async fn delete_transaction(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.transactions.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::TransactionNotFound(id))
        }
    }

    async fn list_transactions(
        &self,
        owner: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .values()
            .filter(|t| {
                t.owner == owner
                    && start_date.is_none_or(|start| t.date >= start)
                    && end_date.is_none_or(|end| t.date <= end)
            })
            .cloned()
            .collect())
    }

    async fn list_account_transactions(
        &self,
        owner: Uuid,
        account_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .values()
            .filter(|t| t.owner == owner && t.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_order_transactions(
        &self,
        owner: Uuid,
        order_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .values()
            .filter(|t| t.owner == owner && t.order_id == Some(order_id))
            .cloned()
            .collect())
    }

    async fn list_purchase_transactions(
        &self,
        owner: Uuid,
        purchase_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .values()
            .filter(|t| t.owner == owner && t.purchase_id == Some(purchase_id))
            .cloned()
            .collect())
    }

    async fn list_debt_transactions(
        &self,
        owner: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .values()
            .filter(|t| t.owner == owner && t.debt_id == Some(debt_id))
            .cloned()
            .collect())
    }

    async fn save_debt(&mut self, debt: &Debt) -> LedgerResult<()> {
        self.debts.write().unwrap().insert(debt.id, debt.clone());
        Ok(())
    }

    async fn get_debt(&self, id: Uuid) -> LedgerResult<Option<Debt>> {
        Ok(self.debts.read().unwrap().get(&id).cloned())
    }

    async fn update_debt(&mut self, debt: &Debt) -> LedgerResult<()> {
        let mut debts = self.debts.write().unwrap();
        if debts.contains_key(&debt.id) {
            debts.insert(debt.id, debt.clone());
            Ok(())
        } else {
            Err(LedgerError::DebtNotFound(debt.id))
        }
    }

    async fn delete_debt(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.debts.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::DebtNotFound(id))
        }
    }

    async fn list_debts(&self, owner: Uuid) -> LedgerResult<Vec<Debt>> {
        Ok(self
            .debts
            .read()
            .unwrap()
            .values()
            .filter(|d| d.owner == owner)
            .cloned()
            .collect())
    }

    async fn find_order_debt(&self, owner: Uuid, order_id: Uuid) -> LedgerResult<Option<Debt>> {
        Ok(self
            .debts
            .read()
            .unwrap()
            .values()
            .find(|d| d.owner == owner && d.order_id == Some(order_id))
            .cloned())
    }

    async fn find_purchase_debt(
        &self,
        owner: Uuid,
        purchase_id: Uuid,
    ) -> LedgerResult<Option<Debt>> {
        Ok(self
            .debts
            .read()
            .unwrap()
            .values()
            .find(|d| d.owner == owner && d.purchase_id == Some(purchase_id))
            .cloned())
    }

    async fn save_order(&mut self, order: &Order) -> LedgerResult<()> {
        self.orders.write().unwrap().insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> LedgerResult<Option<Order>> {
        Ok(self.orders.read().unwrap().get(&id).cloned())
    }

    async fn update_order(&mut self, order: &Order) -> LedgerResult<()> {
        let mut orders = self.orders.write().unwrap();
        if orders.contains_key(&order.id) {
            orders.insert(order.id, order.clone());
            Ok(())
        } else {
            Err(LedgerError::OrderNotFound(order.id))
        }
    }

    async fn delete_order(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.orders.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::OrderNotFound(id))
        }
    }

    async fn list_orders(&self, owner: Uuid) -> LedgerResult<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| o.owner == owner)
            .cloned()
            .collect())
    }

    async fn list_contact_orders(&self, owner: Uuid, contact_id: Uuid) -> LedgerResult<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| o.owner == owner && o.contact_id == Some(contact_id))
            .cloned()
            .collect())
    }

    async fn count_orders_created_on(&self, owner: Uuid, date: NaiveDate) -> LedgerResult<u64> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| o.owner == owner && o.created_at.date() == date)
            .count() as u64)
    }

    async fn invoice_number_exists(&self, invoice_number: &str) -> LedgerResult<bool> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .values()
            .any(|o| o.invoice_number == invoice_number))
    }

    async fn save_purchase(&mut self, purchase: &Purchase) -> LedgerResult<()> {
        self.purchases
            .write()
            .unwrap()
            .insert(purchase.id, purchase.clone());
        Ok(())
    }

    async fn get_purchase(&self, id: Uuid) -> LedgerResult<Option<Purchase>> {
        Ok(self.purchases.read().unwrap().get(&id).cloned())
    }

    async fn update_purchase(&mut self, purchase: &Purchase) -> LedgerResult<()> {
        let mut purchases = self.purchases.write().unwrap();
        if purchases.contains_key(&purchase.id) {
            purchases.insert(purchase.id, purchase.clone());
            Ok(())
        } else {
            Err(LedgerError::PurchaseNotFound(purchase.id))
        }
    }

    async fn delete_purchase(&mut self, id: Uuid) -> LedgerResult<()> {
        if self.purchases.write().unwrap().remove(&id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::PurchaseNotFound(id))
        }
    }

    async fn list_purchases(&self, owner: Uuid) -> LedgerResult<Vec<Purchase>> {
        Ok(self
            .purchases
            .read()
            .unwrap()
            .values()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    async fn count_purchases_created_on(&self, owner: Uuid, date: NaiveDate) -> LedgerResult<u64> {
        Ok(self
            .purchases
            .read()
            .unwrap()
            .values()
            .filter(|p| p.owner == owner && p.created_at.date() == date)
            .count() as u64)
    }

    async fn reference_number_exists(&self, reference_number: &str) -> LedgerResult<bool> {
        Ok(self
            .purchases
            .read()
            .unwrap()
            .values()
            .any(|p| p.reference_number == reference_number))
    }
}
