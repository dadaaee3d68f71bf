//! Sales order workflow

use tracing::info;
use uuid::Uuid;

use crate::debt::DebtManager;
use crate::inventory::StockManager;
use crate::ledger::TransactionManager;
use crate::traits::LedgerStorage;
use crate::types::*;

use super::{
    format_reference, summarize_items, validate_input_status, validate_line_items, OrderDraft,
};

/// Manager for the sales order lifecycle
///
/// Enforces the settlement invariant: a saved order carries exactly one of a
/// linked settlement transaction (paid) or a linked receivable debt
/// (unpaid/partial), never both.
pub struct OrderManager<S: LedgerStorage> {
    storage: S,
    transactions: TransactionManager<S>,
    debts: DebtManager<S>,
    stocks: StockManager<S>,
}

impl<S: LedgerStorage + Clone> OrderManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            transactions: TransactionManager::new(storage.clone()),
            debts: DebtManager::new(storage.clone()),
            stocks: StockManager::new(storage.clone()),
            storage,
        }
    }
}

impl<S: LedgerStorage> OrderManager<S> {
    /// Fetch an order, enforcing ownership
    pub async fn get_required(&self, owner: Uuid, id: Uuid) -> LedgerResult<Order> {
        let order = self
            .storage
            .get_order(id)
            .await?
            .ok_or(LedgerError::OrderNotFound(id))?;
        if order.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(order)
    }

    pub async fn list(&self, owner: Uuid) -> LedgerResult<Vec<Order>> {
        self.storage.list_orders(owner).await
    }

    pub async fn list_for_contact(
        &self,
        owner: Uuid,
        contact_id: Uuid,
    ) -> LedgerResult<Vec<Order>> {
        self.storage.list_contact_orders(owner, contact_id).await
    }

    /// Create an order: header, frozen items, settlement side, stock effects
    pub async fn create(&mut self, owner: Uuid, draft: OrderDraft) -> LedgerResult<Order> {
        validate_input_status(draft.status)?;
        let grand_total = validate_line_items(&draft.items)?;
        self.validate_parties(owner, &draft).await?;

        let invoice_number = self.next_invoice_number(owner).await?;
        let items: Vec<OrderItem> = draft
            .items
            .iter()
            .map(|item| {
                OrderItem::new(
                    item.item_name.clone(),
                    item.qty.clone(),
                    item.price.clone(),
                    item.catalog_item_id,
                    item.stock_id,
                )
            })
            .collect();

        let now = chrono::Utc::now().naive_utc();
        let order = Order {
            id: Uuid::new_v4(),
            owner,
            contact_id: draft.contact_id,
            invoice_number,
            date: draft.date,
            items,
            grand_total: grand_total.clone(),
            status: draft.status,
            note: draft.note.clone(),
            created_at: now,
            updated_at: now,
        };
        self.storage.save_order(&order).await?;

        match draft.status {
            PaymentStatus::Paid => {
                // account presence was validated up front
                let account_id = draft.account_id.ok_or_else(|| {
                    LedgerError::Validation("An account is required for a paid order".to_string())
                })?;
                let mut transaction = Transaction::new(
                    owner,
                    account_id,
                    TransactionKind::Income,
                    grand_total,
                    draft.date,
                    format!(
                        "Sales {}: {}",
                        order.invoice_number,
                        summarize_items(&draft.items)
                    ),
                );
                transaction.category_id = draft.category_id;
                transaction.order_id = Some(order.id);
                self.transactions.record(transaction).await?;
            }
            _ => {
                let contact_id = draft.contact_id.ok_or_else(|| {
                    LedgerError::Validation("A contact is required for an unpaid order".to_string())
                })?;
                let mut debt = Debt::new(owner, contact_id, DebtKind::Receivable, grand_total);
                debt.order_id = Some(order.id);
                debt.due_date = Some(draft.date);
                self.debts.create_linked(debt).await?;
            }
        }

        for item in &order.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks.apply_outflow(owner, stock_id, &item.qty).await?;
            }
        }

        info!(order = %order.id, invoice = %order.invoice_number, total = %order.grand_total, "created order");
        Ok(order)
    }

    /// Replace an order wholesale and reconcile its settlement side
    ///
    /// Line items are fully replaced, not diffed: old stock effects are
    /// reverted before the new ones are applied.
    pub async fn update(&mut self, owner: Uuid, id: Uuid, draft: OrderDraft) -> LedgerResult<Order> {
        let mut order = self.get_required(owner, id).await?;
        validate_input_status(draft.status)?;
        let grand_total = validate_line_items(&draft.items)?;
        self.validate_parties(owner, &draft).await?;

        for item in &order.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks.revert_outflow(owner, stock_id, &item.qty).await?;
            }
        }

        order.items = draft
            .items
            .iter()
            .map(|item| {
                OrderItem::new(
                    item.item_name.clone(),
                    item.qty.clone(),
                    item.price.clone(),
                    item.catalog_item_id,
                    item.stock_id,
                )
            })
            .collect();
        order.contact_id = draft.contact_id;
        order.date = draft.date;
        order.note = draft.note.clone();
        order.grand_total = grand_total.clone();

        for item in &order.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks.apply_outflow(owner, stock_id, &item.qty).await?;
            }
        }

        match draft.status {
            PaymentStatus::Paid => {
                if let Some(debt) = self.storage.find_order_debt(owner, id).await? {
                    // subsumed by full payment; bypasses the unpaid-only guard
                    self.debts.system_delete(debt.id).await?;
                }
                let account_id = draft.account_id.ok_or_else(|| {
                    LedgerError::Validation("An account is required for a paid order".to_string())
                })?;
                let description = format!(
                    "Sales {}: {}",
                    order.invoice_number,
                    summarize_items(&draft.items)
                );
                let settlement = self
                    .storage
                    .list_order_transactions(owner, id)
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
                            TransactionKind::Income,
                            grand_total,
                            draft.date,
                            description,
                        );
                        transaction.category_id = draft.category_id;
                        transaction.order_id = Some(id);
                        self.transactions.record(transaction).await?;
                    }
                }
                order.status = PaymentStatus::Paid;
            }
            _ => {
                let settlements: Vec<Transaction> = self
                    .storage
                    .list_order_transactions(owner, id)
                    .await?
                    .into_iter()
                    .filter(|t| t.debt_id.is_none())
                    .collect();
                for transaction in settlements {
                    self.transactions.delete(owner, transaction.id).await?;
                }

                if let Some(debt) = self.storage.find_order_debt(owner, id).await? {
                    order.status = match self
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
                            "A contact is required for an unpaid order".to_string(),
                        )
                    })?;
                    let mut debt = Debt::new(owner, contact_id, DebtKind::Receivable, grand_total);
                    debt.order_id = Some(id);
                    debt.due_date = Some(draft.date);
                    self.debts.create_linked(debt).await?;
                    order.status = PaymentStatus::Unpaid;
                }
            }
        }

        order.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_order(&order).await?;
        info!(order = %order.id, status = ?order.status, "updated order");
        Ok(order)
    }

    /// Tear an order down: stock effects reverted, linked transactions
    /// deleted one at a time so each reverses its balance effect, linked
    /// debts removed, then the header (items cascade with it)
    pub async fn delete(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        let order = self.get_required(owner, id).await?;

        for item in &order.items {
            if let Some(stock_id) = item.stock_id {
                self.stocks.revert_outflow(owner, stock_id, &item.qty).await?;
            }
        }

        for transaction in self.storage.list_order_transactions(owner, id).await? {
            self.transactions.delete(owner, transaction.id).await?;
        }
        if let Some(debt) = self.storage.find_order_debt(owner, id).await? {
            self.debts.system_delete(debt.id).await?;
        }

        self.storage.delete_order(id).await?;
        info!(order = %id, "deleted order");
        Ok(())
    }

    /// Next free invoice number for today, seeded by today's order count and
    /// bumped past any collision (including manually pre-inserted numbers)
    async fn next_invoice_number(&self, owner: Uuid) -> LedgerResult<String> {
        let today = chrono::Utc::now().date_naive();
        let mut seq = self.storage.count_orders_created_on(owner, today).await? + 1;
        loop {
            let candidate = format_reference("INV", today, seq);
            if !self.storage.invoice_number_exists(&candidate).await? {
                return Ok(candidate);
            }
            seq += 1;
        }
    }

    /// Up-front checks for everything the draft references, before any write
    async fn validate_parties(&self, owner: Uuid, draft: &OrderDraft) -> LedgerResult<()> {
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
                "A contact is required for an unpaid order".to_string(),
            ));
        }

        if draft.status == PaymentStatus::Paid {
            let account_id = draft.account_id.ok_or_else(|| {
                LedgerError::Validation("An account is required for a paid order".to_string())
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
