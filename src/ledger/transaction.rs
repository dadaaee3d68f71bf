//! Transaction processing: the account-balance mutator
//!
//! Every code path that creates, updates, or deletes a transaction goes
//! through this manager, so the paired account-balance adjustment can never
//! be skipped. The original system did this with a model-lifecycle hook; here
//! it is an explicit side effect of each write.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::traits::LedgerStorage;
use crate::types::*;
use crate::utils::validation::validate_positive_amount;

/// Manager owning the transaction lifecycle and its balance side effects
pub struct TransactionManager<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> TransactionManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Fetch a transaction, enforcing ownership
    pub async fn get_required(&self, owner: Uuid, id: Uuid) -> LedgerResult<Transaction> {
        let transaction = self
            .storage
            .get_transaction(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))?;
        if transaction.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(transaction)
    }

    /// Record a transaction and apply its signed effect to the account
    ///
    /// The owning account must exist and belong to the transaction's owner;
    /// a validation failure here aborts before anything is written.
    pub async fn record(&mut self, transaction: Transaction) -> LedgerResult<Transaction> {
        validate_positive_amount(&transaction.amount, "Transaction amount")?;

        let mut account = self
            .storage
            .get_account(transaction.account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(transaction.account_id))?;
        if account.owner != transaction.owner {
            return Err(LedgerError::Unauthorized);
        }
        if let Some(category_id) = transaction.category_id {
            let category = self
                .storage
                .get_category(category_id)
                .await?
                .ok_or(LedgerError::CategoryNotFound(category_id))?;
            if category.owner != transaction.owner {
                return Err(LedgerError::Unauthorized);
            }
        }

        self.storage.save_transaction(&transaction).await?;

        account.apply_effect(transaction.kind, &transaction.amount);
        self.storage.update_account(&account).await?;

        debug!(
            transaction = %transaction.id,
            account = %transaction.account_id,
            amount = %transaction.amount,
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// Replace a transaction: reverse the old effect, apply the new one
    ///
    /// The account may change between the two versions; each side is adjusted
    /// on its own account.
    pub async fn update(&mut self, owner: Uuid, updated: Transaction) -> LedgerResult<Transaction> {
        let old = self.get_required(owner, updated.id).await?;
        validate_positive_amount(&updated.amount, "Transaction amount")?;

        let mut new_account = self
            .storage
            .get_account(updated.account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(updated.account_id))?;
        if new_account.owner != owner {
            return Err(LedgerError::Unauthorized);
        }

        if let Some(mut old_account) = self.storage.get_account(old.account_id).await? {
            old_account.reverse_effect(old.kind, &old.amount);
            self.storage.update_account(&old_account).await?;
        }

        // Re-read in case the old and new account are the same row
        if let Some(account) = self.storage.get_account(updated.account_id).await? {
            new_account = account;
        }
        new_account.apply_effect(updated.kind, &updated.amount);
        self.storage.update_account(&new_account).await?;

        let mut updated = updated;
        updated.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_transaction(&updated).await?;
        Ok(updated)
    }

    /// Delete a transaction, reversing its effect on the account balance
    pub async fn delete(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        let transaction = self.get_required(owner, id).await?;

        if let Some(mut account) = self.storage.get_account(transaction.account_id).await? {
            account.reverse_effect(transaction.kind, &transaction.amount);
            self.storage.update_account(&account).await?;
        }

        self.storage.delete_transaction(id).await?;
        debug!(transaction = %id, "deleted transaction");
        Ok(())
    }

    pub async fn list(
        &self,
        owner: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.storage.list_transactions(owner, start_date, end_date).await
    }

    pub async fn list_for_account(
        &self,
        owner: Uuid,
        account_id: Uuid,
    ) -> LedgerResult<Vec<Transaction>> {
        self.storage.list_account_transactions(owner, account_id).await
    }
}
