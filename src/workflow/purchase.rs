//! Procurement workflow: the buy-side mirror of the order workflow
//!
//! Purchases settle as expenses (paid) or payable debts (unpaid) and, for
//! stock-linked line items, feed the weighted-average valuation. Edits revert
//! the old items' stock inflows before applying the new ones so the blended
//! average stays coherent.

use tracing::info;
use uuid::Uuid;

use crate::debt::DebtManager;
use crate::inventory::StockManager;
use crate::ledger::TransactionManager;
use crate::traits::LedgerStorage;
use crate::types::*;

use super::{
    format_reference, summarize_items, validate_input_status, validate_line_items, PurchaseDraft,
};

/// Manager for the purchase lifecycle
pub struct PurchaseManager<S: LedgerStorage> {
    storage: S,
    transactions: TransactionManager<S>,
    debts: DebtManager<S>,
    stocks: StockManager<S>,
}

impl<S: LedgerStorage + Clone> PurchaseManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            transactions: TransactionManager::new(storage.clone()),
            debts: DebtManager::new(storage.clone()),
            stocks: StockManager::new(storage.clone()),
            storage,
        }
    }
}

impl<S: LedgerStorage> PurchaseManager<S> {
    /// Fetch a purchase, enforcing ownership
    pub async fn get_required(&self, owner: Uuid, id: Uuid) -> LedgerResult<Purchase> {
        let purchase = self
            .storage
            .get_purchase(id)
            .await?
            .ok_or(LedgerError::PurchaseNotFound(id))?;
        if purchase.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(purchase)
    }

    pub async fn list(&self, owner: Uuid) -> LedgerResult<Vec<Purchase>> {
        self.storage.list_purchases(owner).await
    }

    /// Create a purchase: header, frozen items, settlement side, stock inflows
    pub async fn create(&mut self, owner: Uuid, draft: PurchaseDraft) -> LedgerResult<Purchase> {
        validate_input_status(draft.status)?;
        let grand_total = validate_line_items(&draft.items)?;
        self.validate_parties(owner, &draft).await?;

        let reference_number = self.next_reference_number(owner).await?;
        let items: Vec<PurchaseItem> = draft
            .items
            .iter()
            .map(|item| {
                PurchaseItem::new(
                    item.item_name.clone(),
                    item.qty.clone(),
                    item.price.clone(),
                    item.catalog_item_id,
                    item.stock_id,
                )
            })
            .collect();

        let now = chrono::Utc::now().naive_utc();
        let purchase = Purchase {
            id: Uuid::new_v4(),
            owner,
            contact_id: draft.contact_id,
            order_id: draft.order_id,
            reference_number,
            date: draft.date,
            items,
            grand_total: grand_total.clone(),
            status: draft.status,
            note: draft.note.clone(),
            created_at: now,
            updated_at: now,
        };
        self.storage.save_purchase(&purchase).await?;

        match draft.status {
            PaymentStatus::Paid => {
                let account_id = draft.account_id.ok_or_else(|| {
                    LedgerError::Validation(
                        "An account is required for a paid purchase".to_string(),
                    )
                })?;
                let mut transaction = Transaction::new(
                    owner,
                    account_id,
                    TransactionKind::Expense,
                    grand_total,
                    draft.date,
                    format!(
                        "Purchase {}: {}",
                        purchase.reference_number,
                        summarize_items(&draft.items)
                    ),
                );
                transaction.category_id = draft.category_id;
                transaction.purchase_id = Some(purchase.id);
                self.transactions.record(transaction).await?;
            }
            _ => {
                let contact_id = draft.contact_id.ok_or_else(|| {
                    LedgerError::Validation(
                        "A contact is required for an unpaid purchase".to_string(),
                    )
                })?;
                let mut debt = Debt::new(owner, contact_id, DebtKind::Payable, grand_total);
                debt.purchase_id = Some(purchase.id);
                debt.due_date = Some(draft.date);
                self.debts.create_linked(debt).await?;
            }
        }

        for item in &purchase.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks
                    .apply_inflow(owner, stock_id, &item.qty, &item.price, StockMutationKind::Purchase)
                    .await?;
            }
        }

        info!(purchase = %purchase.id, reference = %purchase.reference_number, total = %purchase.grand_total, "created purchase");
        Ok(purchase)
    }

    /// Replace a purchase wholesale and reconcile its settlement side
    ///
    /// Stock discipline: revert the inflow of every old item first, then
    /// apply the inflow of every new item, in that order.
    pub async fn update(
        &mut self,
        owner: Uuid,
        id: Uuid,
        draft: PurchaseDraft,
    ) -> LedgerResult<Purchase> {
        let mut purchase = self.get_required(owner, id).await?;
        validate_input_status(draft.status)?;
        let grand_total = validate_line_items(&draft.items)?;
        self.validate_parties(owner, &draft).await?;

        for item in &purchase.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks
                    .revert_inflow(owner, stock_id, &item.qty, &item.price, StockMutationKind::Purchase)
                    .await?;
            }
        }

        purchase.items = draft
            .items
            .iter()
            .map(|item| {
                PurchaseItem::new(
                    item.item_name.clone(),
                    item.qty.clone(),
                    item.price.clone(),
                    item.catalog_item_id,
                    item.stock_id,
                )
            })
            .collect();
        purchase.contact_id = draft.contact_id;
        purchase.order_id = draft.order_id;
        purchase.date = draft.date;
        purchase.note = draft.note.clone();
        purchase.grand_total = grand_total.clone();

        for item in &purchase.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks
                    .apply_inflow(owner, stock_id, &item.qty, &item.price, StockMutationKind::Purchase)
                    .await?;
            }
        }

        match draft.status {
            PaymentStatus::Paid => {
                if let Some(debt) = self.storage.find_purchase_debt(owner, id).await? {
                    self.debts.system_delete(debt.id).await?;
                }
                let account_id = draft.account_id.ok_or_else(|| {
                    LedgerError::Validation(
                        "An account is required for a paid purchase".to_string(),
                    )
                })?;
                let description = format!(
                    "Purchase {}: {}",
                    purchase.reference_number,
                    summarize_items(&draft.items)
                );
                let settlement = self
                    .storage
                    .list_purchase_transactions(owner, id)
                    .await?
                    .into_iter()
                    .find(|t| t.debt_id.is_none());
                match settlement {
                    Some(mut transaction) => {
                        transaction.account_id = account_id;
                        transaction.category_id = draft.category_id;
                        transaction.amount = grand_total;
                        transaction.date = draft.date;
                        transaction.description = description;
                        self.transactions.update(owner, transaction).await?;
                    }
                    None => {
                        let mut transaction = Transaction::new(
                            owner,
                            account_id,
                            TransactionKind::Expense,
                            grand_total,
                            draft.date,
                            description,
                        );
                        transaction.category_id = draft.category_id;
                        transaction.purchase_id = Some(id);
                        self.transactions.record(transaction).await?;
                    }
                }
                purchase.status = PaymentStatus::Paid;
            }
            _ => {
                let settlements: Vec<Transaction> = self
                    .storage
                    .list_purchase_transactions(owner, id)
                    .await?
                    .into_iter()
                    .filter(|t| t.debt_id.is_none())
                    .collect();
                for transaction in settlements {
                    self.transactions.delete(owner, transaction.id).await?;
                }

                if let Some(debt) = self.storage.find_purchase_debt(owner, id).await? {
                    purchase.status = match self
                        .debts
                        .reconcile_total(owner, debt.id, &grand_total)
                        .await?
                    {
                        Some(debt) => debt.status,
                        None => PaymentStatus::Paid,
                    };
                } else {
                    let contact_id = draft.contact_id.ok_or_else(|| {
                        LedgerError::Validation(
                            "A contact is required for an unpaid purchase".to_string(),
                        )
                    })?;
                    let mut debt = Debt::new(owner, contact_id, DebtKind::Payable, grand_total);
                    debt.purchase_id = Some(id);
                    debt.due_date = Some(draft.date);
                    self.debts.create_linked(debt).await?;
                    purchase.status = PaymentStatus::Unpaid;
                }
            }
        }

        purchase.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_purchase(&purchase).await?;
        info!(purchase = %purchase.id, status = ?purchase.status, "updated purchase");
        Ok(purchase)
    }

    /// Tear a purchase down: stock inflows reverted, linked transactions
    /// deleted one at a time, linked debts removed, then the header
    pub async fn delete(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        let purchase = self.get_required(owner, id).await?;

        for item in &purchase.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks
                    .revert_inflow(owner, stock_id, &item.qty, &item.price, StockMutationKind::Purchase)
                    .await?;
            }
        }

        for transaction in self.storage.list_purchase_transactions(owner, id).await? {
            self.transactions.delete(owner, transaction.id).await?;
        }
        if let Some(debt) = self.storage.find_purchase_debt(owner, id).await? {
            self.debts.system_delete(debt.id).await?;
        }

        self.storage.delete_purchase(id).await?;
        info!(purchase = %id, "deleted purchase");
        Ok(())
    }

    async fn next_reference_number(&self, owner: Uuid) -> LedgerResult<String> {
        let today = chrono::Utc::now().date_naive();
        let mut seq = self.storage.count_purchases_created_on(owner, today).await? + 1;
        loop {
            let candidate = format_reference("PUR", today, seq);
            if !self.storage.reference_number_exists(&candidate).await? {
                return Ok(candidate);
            }
            seq += 1;
        }
    }

    async fn validate_parties(&self, owner: Uuid, draft: &PurchaseDraft) -> LedgerResult<()> {
        if let Some(contact_id) = draft.contact_id {
            let contact = self
                .storage
                .get_contact(contact_id)
                .await?
                .ok_or(LedgerError::ContactNotFound(contact_id))?;
            if contact.owner != owner {
                return Err(LedgerError::Unauthorized);
            }
        } else if draft.status != PaymentStatus::Paid {
            return Err(LedgerError::Validation(
                "A contact is required for an unpaid purchase".to_string(),
            ));
        }

        if let Some(order_id) = draft.order_id {
            let order = self
                .storage
                .get_order(order_id)
                .await?
                .ok_or(LedgerError::OrderNotFound(order_id))?;
            if order.owner != owner {
                return Err(LedgerError::Unauthorized);
            }
        }

        if draft.status == PaymentStatus::Paid {
            let account_id = draft.account_id.ok_or_else(|| {
                LedgerError::Validation("An account is required for a paid purchase".to_string())
            })?;
            let account = self
                .storage
                .get_account(account_id)
                .await?
                .ok_or(LedgerError::AccountNotFound(account_id))?;
            if account.owner != owner {
                return Err(LedgerError::Unauthorized);
            }
            if let Some(category_id) = draft.category_id {
                let category = self
                    .storage
                    .get_category(category_id)
                    .await?
                    .ok_or(LedgerError::CategoryNotFound(category_id))?;
                if category.owner != owner {
                    return Err(LedgerError::Unauthorized);
                }
            }
        }

        for item in &draft.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks.get_required(owner, stock_id).await?;
            }
        }
        Ok(())
    }
}
