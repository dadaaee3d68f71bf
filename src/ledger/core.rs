//! Main ledger facade that coordinates accounts, transactions, stock, debts,
//! and the sales/purchase workflows
//!
//! Every operation takes the acting owner explicitly; nothing is resolved
//! from ambient state. One facade call corresponds to one user action and is
//! expected to run as a single unit of work against the storage backend.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::debt::{DebtDraft, DebtManager, PaymentDraft};
use crate::inventory::StockManager;
use crate::ledger::{AccountManager, TransactionManager};
use crate::reports;
use crate::traits::LedgerStorage;
use crate::types::*;
use crate::utils::validation::{validate_name, validate_positive_amount};
use crate::workflow::{OrderDraft, OrderManager, PurchaseDraft, PurchaseManager};

/// Bookkeeping system facade over a storage backend
pub struct Ledger<S: LedgerStorage> {
    storage: S,
    accounts: AccountManager<S>,
    transactions: TransactionManager<S>,
    stocks: StockManager<S>,
    debts: DebtManager<S>,
    orders: OrderManager<S>,
    purchases: PurchaseManager<S>,
}

impl<S: LedgerStorage + Clone> Ledger<S> {
    /// Create a new ledger over the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            accounts: AccountManager::new(storage.clone()),
            transactions: TransactionManager::new(storage.clone()),
            stocks: StockManager::new(storage.clone()),
            debts: DebtManager::new(storage.clone()),
            orders: OrderManager::new(storage.clone()),
            purchases: PurchaseManager::new(storage.clone()),
            storage,
        }
    }
}

impl<S: LedgerStorage> Ledger<S> {
    // ----- Accounts -----

    pub async fn create_account(
        &mut self,
        owner: Uuid,
        name: String,
        opening_balance: BigDecimal,
    ) -> LedgerResult<Account> {
        self.accounts.create(owner, name, opening_balance).await
    }

    pub async fn get_account(&self, owner: Uuid, id: Uuid) -> LedgerResult<Account> {
        self.accounts.get_required(owner, id).await
    }

    pub async fn list_accounts(&self, owner: Uuid) -> LedgerResult<Vec<Account>> {
        self.accounts.list(owner).await
    }

    pub async fn rename_account(
        &mut self,
        owner: Uuid,
        id: Uuid,
        name: String,
    ) -> LedgerResult<Account> {
        self.accounts.rename(owner, id, name).await
    }

    /// Delete an account and cascade its transactions
    ///
    /// Each transaction is deleted individually so its balance reversal
    /// fires; a bulk delete would skip the side effect.
    pub async fn delete_account(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.accounts.get_required(owner, id).await?;
        for transaction in self.storage.list_account_transactions(owner, id).await? {
            self.transactions.delete(owner, transaction.id).await?;
        }
        self.accounts.delete_row(owner, id).await
    }

    // ----- Categories -----

    pub async fn create_category(
        &mut self,
        owner: Uuid,
        name: String,
        kind: CategoryKind,
    ) -> LedgerResult<Category> {
        validate_name(&name, "Category name")?;
        let category = Category::new(owner, name, kind);
        self.storage.save_category(&category).await?;
        Ok(category)
    }

    pub async fn list_categories(&self, owner: Uuid) -> LedgerResult<Vec<Category>> {
        self.storage.list_categories(owner).await
    }

    pub async fn update_category(
        &mut self,
        owner: Uuid,
        id: Uuid,
        name: String,
        kind: CategoryKind,
    ) -> LedgerResult<Category> {
        validate_name(&name, "Category name")?;
        let mut category = self
            .storage
            .get_category(id)
            .await?
            .ok_or(LedgerError::CategoryNotFound(id))?;
        if category.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        category.name = name;
        category.kind = kind;
        self.storage.update_category(&category).await?;
        Ok(category)
    }

    pub async fn delete_category(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        let category = self
            .storage
            .get_category(id)
            .await?
            .ok_or(LedgerError::CategoryNotFound(id))?;
        if category.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        self.storage.delete_category(id).await
    }

    // ----- Contacts -----

    pub async fn create_contact(&mut self, owner: Uuid, contact: Contact) -> LedgerResult<Contact> {
        validate_name(&contact.name, "Contact name")?;
        if contact.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        self.storage.save_contact(&contact).await?;
        Ok(contact)
    }

    pub async fn get_contact(&self, owner: Uuid, id: Uuid) -> LedgerResult<Contact> {
        let contact = self
            .storage
            .get_contact(id)
            .await?
            .ok_or(LedgerError::ContactNotFound(id))?;
        if contact.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(contact)
    }

    pub async fn list_contacts(&self, owner: Uuid) -> LedgerResult<Vec<Contact>> {
        self.storage.list_contacts(owner).await
    }

    pub async fn update_contact(&mut self, owner: Uuid, contact: Contact) -> LedgerResult<Contact> {
        validate_name(&contact.name, "Contact name")?;
        self.get_contact(owner, contact.id).await?;
        self.storage.update_contact(&contact).await?;
        Ok(contact)
    }

    pub async fn delete_contact(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.get_contact(owner, id).await?;
        self.storage.delete_contact(id).await
    }

    // ----- Catalogs -----

    pub async fn create_item(&mut self, owner: Uuid, item: Item) -> LedgerResult<Item> {
        validate_name(&item.name, "Item name")?;
        if item.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        self.storage.save_item(&item).await?;
        Ok(item)
    }

    pub async fn list_items(&self, owner: Uuid) -> LedgerResult<Vec<Item>> {
        self.storage.list_items(owner).await
    }

    pub async fn create_supplier_item(
        &mut self,
        owner: Uuid,
        item: SupplierItem,
    ) -> LedgerResult<SupplierItem> {
        validate_name(&item.name, "Item name")?;
        if item.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        self.storage.save_supplier_item(&item).await?;
        Ok(item)
    }

    pub async fn list_supplier_items(&self, owner: Uuid) -> LedgerResult<Vec<SupplierItem>> {
        self.storage.list_supplier_items(owner).await
    }

    // ----- Standalone transactions -----

    /// Record a standalone transaction against an account
    pub async fn record_transaction(&mut self, transaction: Transaction) -> LedgerResult<Transaction> {
        self.transactions.record(transaction).await
    }

    pub async fn get_transaction(&self, owner: Uuid, id: Uuid) -> LedgerResult<Transaction> {
        self.transactions.get_required(owner, id).await
    }

    pub async fn list_transactions(
        &self,
        owner: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transactions.list(owner, start_date, end_date).await
    }

    pub async fn list_account_transactions(
        &self,
        owner: Uuid,
        account_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transactions.list_for_account(owner, account_id).await
    }

    /// Update a standalone transaction
    ///
    /// Transactions produced by orders, purchases, or debt payments are
    /// system-managed; editing them here would desynchronize their source
    /// record, so the caller is directed there instead.
    pub async fn update_transaction(
        &mut self,
        owner: Uuid,
        transaction: Transaction,
    ) -> LedgerResult<Transaction> {
        let existing = self.transactions.get_required(owner, transaction.id).await?;
        Self::guard_standalone(&existing)?;
        self.transactions.update(owner, transaction).await
    }

    /// Delete a standalone transaction, reversing its balance effect
    pub async fn delete_transaction(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        let existing = self.transactions.get_required(owner, id).await?;
        Self::guard_standalone(&existing)?;
        self.transactions.delete(owner, id).await
    }

    fn guard_standalone(transaction: &Transaction) -> LedgerResult<()> {
        if transaction.order_id.is_some()
            || transaction.purchase_id.is_some()
            || transaction.debt_id.is_some()
        {
            return Err(LedgerError::InvalidOperation(
                "This transaction is managed by an order, purchase, or debt payment; \
                 edit the owning record instead"
                    .to_string(),
            ));
        }
        Ok(())
    }

    // ----- Stock -----

    pub async fn create_stock(
        &mut self,
        owner: Uuid,
        name: String,
        unit: String,
        selling_price: BigDecimal,
    ) -> LedgerResult<Stock> {
        self.stocks.create(owner, name, unit, selling_price).await
    }

    pub async fn get_stock(&self, owner: Uuid, id: Uuid) -> LedgerResult<Stock> {
        self.stocks.get_required(owner, id).await
    }

    pub async fn list_stocks(&self, owner: Uuid) -> LedgerResult<Vec<Stock>> {
        self.stocks.list(owner).await
    }

    /// Edit a stock item's descriptive fields (name, unit, selling price)
    pub async fn edit_stock(
        &mut self,
        owner: Uuid,
        id: Uuid,
        name: String,
        unit: String,
        selling_price: BigDecimal,
    ) -> LedgerResult<Stock> {
        self.stocks.edit(owner, id, name, unit, selling_price).await
    }

    pub async fn delete_stock(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.stocks.delete(owner, id).await
    }

    pub async fn stock_mutations(
        &self,
        owner: Uuid,
        stock_id: Uuid,
    ) -> LedgerResult<Vec<StockMutation>> {
        self.stocks.mutations(owner, stock_id).await
    }

    /// Manual IN adjustment: blend `qty` units at `unit_cost` into the
    /// weighted average
    pub async fn adjust_stock_in(
        &mut self,
        owner: Uuid,
        stock_id: Uuid,
        qty: BigDecimal,
        unit_cost: BigDecimal,
    ) -> LedgerResult<Stock> {
        validate_positive_amount(&qty, "Adjustment quantity")?;
        self.stocks
            .apply_inflow(owner, stock_id, &qty, &unit_cost, StockMutationKind::In)
            .await
    }

    /// Manual OUT adjustment: a direct sale bypassing the order workflow
    ///
    /// Decrements quantity (average cost untouched, no negative floor) and
    /// records one income transaction for qty × selling_price.
    pub async fn adjust_stock_out(
        &mut self,
        owner: Uuid,
        stock_id: Uuid,
        qty: BigDecimal,
        account_id: Uuid,
        category_id: Option<Uuid>,
        date: NaiveDate,
    ) -> LedgerResult<Stock> {
        validate_positive_amount(&qty, "Adjustment quantity")?;
        let stock = self.stocks.get_required(owner, stock_id).await?;

        let amount = &qty * &stock.selling_price;
        let mut transaction = Transaction::new(
            owner,
            account_id,
            TransactionKind::Income,
            amount,
            date,
            format!("Stock sale: {} x{}", stock.name, qty),
        );
        transaction.category_id = category_id;
        self.transactions.record(transaction).await?;

        self.stocks.apply_outflow(owner, stock_id, &qty).await
    }

    // ----- Debts -----

    pub async fn create_debt(&mut self, owner: Uuid, draft: DebtDraft) -> LedgerResult<Debt> {
        self.debts.create_manual(owner, draft).await
    }

    pub async fn get_debt(&self, owner: Uuid, id: Uuid) -> LedgerResult<Debt> {
        self.debts.get_required(owner, id).await
    }

    pub async fn list_debts(&self, owner: Uuid) -> LedgerResult<Vec<Debt>> {
        self.debts.list(owner).await
    }

    pub async fn update_debt(
        &mut self,
        owner: Uuid,
        id: Uuid,
        draft: DebtDraft,
    ) -> LedgerResult<Debt> {
        self.debts.update_manual(owner, id, draft).await
    }

    pub async fn delete_debt(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.debts.delete_manual(owner, id).await
    }

    /// Record a payment against a debt
    pub async fn pay_debt(
        &mut self,
        owner: Uuid,
        debt_id: Uuid,
        payment: PaymentDraft,
    ) -> LedgerResult<(Transaction, Debt)> {
        self.debts
            .record_payment(&mut self.transactions, owner, debt_id, payment)
            .await
    }

    /// Record a payment against an order's outstanding debt
    pub async fn pay_order(
        &mut self,
        owner: Uuid,
        order_id: Uuid,
        payment: PaymentDraft,
    ) -> LedgerResult<(Transaction, Debt)> {
        self.orders.get_required(owner, order_id).await?;
        let debt = self
            .storage
            .find_order_debt(owner, order_id)
            .await?
            .ok_or_else(|| {
                LedgerError::InvalidOperation(
                    "This order has no outstanding debt to pay".to_string(),
                )
            })?;
        self.pay_debt(owner, debt.id, payment).await
    }

    /// Record a payment against a purchase's outstanding debt
    pub async fn pay_purchase(
        &mut self,
        owner: Uuid,
        purchase_id: Uuid,
        payment: PaymentDraft,
    ) -> LedgerResult<(Transaction, Debt)> {
        self.purchases.get_required(owner, purchase_id).await?;
        let debt = self
            .storage
            .find_purchase_debt(owner, purchase_id)
            .await?
            .ok_or_else(|| {
                LedgerError::InvalidOperation(
                    "This purchase has no outstanding debt to pay".to_string(),
                )
            })?;
        self.pay_debt(owner, debt.id, payment).await
    }

    // ----- Orders -----

    pub async fn create_order(&mut self, owner: Uuid, draft: OrderDraft) -> LedgerResult<Order> {
        self.orders.create(owner, draft).await
    }

    pub async fn get_order(&self, owner: Uuid, id: Uuid) -> LedgerResult<Order> {
        self.orders.get_required(owner, id).await
    }

    pub async fn list_orders(&self, owner: Uuid) -> LedgerResult<Vec<Order>> {
        self.orders.list(owner).await
    }

    pub async fn update_order(
        &mut self,
        owner: Uuid,
        id: Uuid,
        draft: OrderDraft,
    ) -> LedgerResult<Order> {
        self.orders.update(owner, id, draft).await
    }

    pub async fn delete_order(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.orders.delete(owner, id).await
    }

    // ----- Purchases -----

    pub async fn create_purchase(
        &mut self,
        owner: Uuid,
        draft: PurchaseDraft,
    ) -> LedgerResult<Purchase> {
        self.purchases.create(owner, draft).await
    }

    pub async fn get_purchase(&self, owner: Uuid, id: Uuid) -> LedgerResult<Purchase> {
        self.purchases.get_required(owner, id).await
    }

    pub async fn list_purchases(&self, owner: Uuid) -> LedgerResult<Vec<Purchase>> {
        self.purchases.list(owner).await
    }

    pub async fn update_purchase(
        &mut self,
        owner: Uuid,
        id: Uuid,
        draft: PurchaseDraft,
    ) -> LedgerResult<Purchase> {
        self.purchases.update(owner, id, draft).await
    }

    pub async fn delete_purchase(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.purchases.delete(owner, id).await
    }

    // ----- Reports -----

    pub async fn daily_cashflow(
        &self,
        owner: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<reports::CashflowReport> {
        reports::daily_cashflow(&self.storage, owner, start_date, end_date).await
    }

    pub async fn debt_summary(&self, owner: Uuid) -> LedgerResult<reports::DebtSummary> {
        reports::debt_summary(&self.storage, owner).await
    }

    pub async fn contact_statement(
        &self,
        owner: Uuid,
        contact_id: Uuid,
    ) -> LedgerResult<reports::ContactStatement> {
        reports::contact_statement(&self.storage, owner, contact_id).await
    }

    pub async fn stock_valuation(&self, owner: Uuid) -> LedgerResult<reports::StockValuationReport> {
        reports::stock_valuation(&self.storage, owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn transaction_lifecycle_moves_the_account_balance() {
        let mut ledger = Ledger::new(MemoryStorage::new());
        let owner = Uuid::new_v4();

        let account = ledger
            .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
            .await
            .unwrap();

        let transaction = ledger
            .record_transaction(Transaction::new(
                owner,
                account.id,
                TransactionKind::Income,
                BigDecimal::from(500),
                date(2024, 1, 10),
                "Opening sale".to_string(),
            ))
            .await
            .unwrap();

        let account = ledger.get_account(owner, account.id).await.unwrap();
        assert_eq!(account.balance, BigDecimal::from(500));

        ledger
            .delete_transaction(owner, transaction.id)
            .await
            .unwrap();
        let account = ledger.get_account(owner, account.id).await.unwrap();
        assert_eq!(account.balance, BigDecimal::from(0));
    }

    #[tokio::test]
    async fn cross_owner_access_is_rejected() {
        let mut ledger = Ledger::new(MemoryStorage::new());
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();

        let account = ledger
            .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
            .await
            .unwrap();

        let result = ledger.get_account(intruder, account.id).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized)));
    }

    #[tokio::test]
    async fn account_deletion_cascades_transactions_individually() {
        let mut ledger = Ledger::new(MemoryStorage::new());
        let owner = Uuid::new_v4();

        let account = ledger
            .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
            .await
            .unwrap();
        for amount in [100, 250] {
            ledger
                .record_transaction(Transaction::new(
                    owner,
                    account.id,
                    TransactionKind::Income,
                    BigDecimal::from(amount),
                    date(2024, 2, 1),
                    "Sale".to_string(),
                ))
                .await
                .unwrap();
        }

        ledger.delete_account(owner, account.id).await.unwrap();
        let remaining = ledger.list_transactions(owner, None, None).await.unwrap();
        assert!(remaining.is_empty());
    }
}
