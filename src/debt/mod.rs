//! Debt tracker: outstanding payables/receivables and the payment operation
//!
//! Remaining only ever shrinks (apart from header edits on manual, unpaid
//! debts), and status is derived from it. Debts linked to an order or
//! purchase are system-managed: direct edits and deletes are rejected and
//! must go through the owning record.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::ledger::TransactionManager;
use crate::traits::LedgerStorage;
use crate::types::*;
use crate::utils::validation::validate_positive_amount;

/// Input for creating or editing a manual debt
#[derive(Debug, Clone)]
pub struct DebtDraft {
    pub contact_id: Uuid,
    pub kind: DebtKind,
    pub amount: BigDecimal,
    pub due_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Input for the payment operation
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub amount: BigDecimal,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Manager for the debt lifecycle
pub struct DebtManager<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> DebtManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Fetch a debt, enforcing ownership
    pub async fn get_required(&self, owner: Uuid, id: Uuid) -> LedgerResult<Debt> {
        let debt = self
            .storage
            .get_debt(id)
            .await?
            .ok_or(LedgerError::DebtNotFound(id))?;
        if debt.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(debt)
    }

    pub async fn list(&self, owner: Uuid) -> LedgerResult<Vec<Debt>> {
        self.storage.list_debts(owner).await
    }

    /// Create a manual (user-entered) debt, fully outstanding
    pub async fn create_manual(&mut self, owner: Uuid, draft: DebtDraft) -> LedgerResult<Debt> {
        validate_positive_amount(&draft.amount, "Debt amount")?;
        let contact = self
            .storage
            .get_contact(draft.contact_id)
            .await?
            .ok_or(LedgerError::ContactNotFound(draft.contact_id))?;
        if contact.owner != owner {
            return Err(LedgerError::Unauthorized);
        }

        let mut debt = Debt::new(owner, draft.contact_id, draft.kind, draft.amount);
        debt.due_date = draft.due_date;
        debt.note = draft.note;
        self.storage.save_debt(&debt).await?;
        Ok(debt)
    }

    /// Edit a manual debt; the remaining balance resets to the new amount
    ///
    /// Permitted only while the debt is untouched: unpaid and not managed by
    /// an order or purchase.
    pub async fn update_manual(
        &mut self,
        owner: Uuid,
        id: Uuid,
        draft: DebtDraft,
    ) -> LedgerResult<Debt> {
        let mut debt = self.get_required(owner, id).await?;
        self.guard_unmanaged(&debt, "edited")?;
        validate_positive_amount(&draft.amount, "Debt amount")?;
        let contact = self
            .storage
            .get_contact(draft.contact_id)
            .await?
            .ok_or(LedgerError::ContactNotFound(draft.contact_id))?;
        if contact.owner != owner {
            return Err(LedgerError::Unauthorized);
        }

        debt.contact_id = draft.contact_id;
        debt.kind = draft.kind;
        debt.remaining = draft.amount.clone();
        debt.amount = draft.amount;
        debt.due_date = draft.due_date;
        debt.note = draft.note;
        debt.recompute_status();
        self.storage.update_debt(&debt).await?;
        Ok(debt)
    }

    /// Delete a manual debt, under the same guards as editing
    pub async fn delete_manual(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        let debt = self.get_required(owner, id).await?;
        self.guard_unmanaged(&debt, "deleted")?;
        self.storage.delete_debt(id).await
    }

    /// Persist a debt created by an order/purchase workflow
    pub(crate) async fn create_linked(&mut self, debt: Debt) -> LedgerResult<Debt> {
        self.storage.save_debt(&debt).await?;
        Ok(debt)
    }

    /// System-driven delete from an order/purchase workflow; bypasses the
    /// manual-edit guards because the debt is being subsumed or torn down
    /// with its owning record
    pub(crate) async fn system_delete(&mut self, id: Uuid) -> LedgerResult<()> {
        self.storage.delete_debt(id).await
    }

    /// Reconcile a linked debt against its order/purchase's new grand total
    ///
    /// Previously collected payments are preserved: the new remaining is the
    /// new total minus what was already paid, floored at zero. A debt that
    /// reaches fully paid through this path is deleted outright; its
    /// financial effect is then captured entirely by the transaction side.
    /// Returns the surviving debt, or `None` if it was deleted.
    pub(crate) async fn reconcile_total(
        &mut self,
        owner: Uuid,
        id: Uuid,
        new_total: &BigDecimal,
    ) -> LedgerResult<Option<Debt>> {
        let mut debt = self.get_required(owner, id).await?;
        let zero = BigDecimal::from(0);

        let paid = debt.paid_amount();
        let mut new_remaining = new_total - &paid;
        if new_remaining < zero {
            new_remaining = zero.clone();
        }

        if new_remaining <= zero {
            self.storage.delete_debt(id).await?;
            return Ok(None);
        }

        debt.amount = new_total.clone();
        debt.remaining = new_remaining;
        debt.status = if paid > zero {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        };
        debt.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_debt(&debt).await?;
        Ok(Some(debt))
    }

    /// Record a partial or full payment against a debt
    ///
    /// Creates one transaction (income for a receivable, expense for a
    /// payable) linked to both the debt and its order/purchase, decrements
    /// the remaining balance, and propagates the resulting status onto the
    /// linked order/purchase header. The debt row persists even once fully
    /// paid, unlike the reconcile path, which deletes it.
    pub async fn record_payment(
        &mut self,
        transactions: &mut TransactionManager<S>,
        owner: Uuid,
        debt_id: Uuid,
        payment: PaymentDraft,
    ) -> LedgerResult<(Transaction, Debt)> {
        let mut debt = self.get_required(owner, debt_id).await?;
        validate_positive_amount(&payment.amount, "Payment amount")?;
        if payment.amount > debt.remaining {
            return Err(LedgerError::Validation(format!(
                "Payment amount {} exceeds remaining debt {}",
                payment.amount, debt.remaining
            )));
        }

        let kind = match debt.kind {
            DebtKind::Receivable => TransactionKind::Income,
            DebtKind::Payable => TransactionKind::Expense,
        };
        let description = payment.note.clone().unwrap_or_else(|| match debt.kind {
            DebtKind::Receivable => "Debt payment received".to_string(),
            DebtKind::Payable => "Debt payment sent".to_string(),
        });

        let mut transaction = Transaction::new(
            owner,
            payment.account_id,
            kind,
            payment.amount.clone(),
            payment.date,
            description,
        );
        transaction.category_id = payment.category_id;
        transaction.debt_id = Some(debt.id);
        transaction.order_id = debt.order_id;
        transaction.purchase_id = debt.purchase_id;
        let transaction = transactions.record(transaction).await?;

        debt.remaining = &debt.remaining - &payment.amount;
        debt.recompute_status();
        self.storage.update_debt(&debt).await?;

        if let Some(order_id) = debt.order_id {
            if let Some(mut order) = self.storage.get_order(order_id).await? {
                order.status = debt.status;
                order.updated_at = chrono::Utc::now().naive_utc();
                self.storage.update_order(&order).await?;
            }
        }
        if let Some(purchase_id) = debt.purchase_id {
            if let Some(mut purchase) = self.storage.get_purchase(purchase_id).await? {
                purchase.status = debt.status;
                purchase.updated_at = chrono::Utc::now().naive_utc();
                self.storage.update_purchase(&purchase).await?;
            }
        }

        info!(debt = %debt.id, amount = %payment.amount, status = ?debt.status, "recorded debt payment");
        Ok((transaction, debt))
    }

    fn guard_unmanaged(&self, debt: &Debt, action: &str) -> LedgerResult<()> {
        if debt.is_linked() {
            return Err(LedgerError::InvalidOperation(format!(
                "This debt is managed by its order/purchase and cannot be {action} directly; \
                 edit the owning record instead"
            )));
        }
        if debt.status != PaymentStatus::Unpaid {
            return Err(LedgerError::InvalidOperation(format!(
                "Only unpaid debts can be {action}; this debt has recorded payments"
            )));
        }
        Ok(())
    }
}
