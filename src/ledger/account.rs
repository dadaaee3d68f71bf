//! Account management

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::traits::LedgerStorage;
use crate::types::*;
use crate::utils::validation::validate_name;

/// Manager for cash accounts
///
/// Balances are never written here directly; they move only through the
/// transaction manager's apply/reverse effects. Deleting an account cascades
/// its transactions one row at a time, which the [`Ledger`](crate::Ledger)
/// facade orchestrates so each deletion reverses its balance effect first.
pub struct AccountManager<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> AccountManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new account with an opening balance
    pub async fn create(
        &mut self,
        owner: Uuid,
        name: String,
        opening_balance: BigDecimal,
    ) -> LedgerResult<Account> {
        validate_name(&name, "Account name")?;
        let account = Account::new(owner, name, opening_balance);
        self.storage.save_account(&account).await?;
        Ok(account)
    }

    /// Fetch an account, enforcing ownership
    pub async fn get_required(&self, owner: Uuid, id: Uuid) -> LedgerResult<Account> {
        let account = self
            .storage
            .get_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        if account.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(account)
    }

    pub async fn list(&self, owner: Uuid) -> LedgerResult<Vec<Account>> {
        self.storage.list_accounts(owner).await
    }

    /// Rename an account; the balance is not user-editable
    pub async fn rename(&mut self, owner: Uuid, id: Uuid, name: String) -> LedgerResult<Account> {
        validate_name(&name, "Account name")?;
        let mut account = self.get_required(owner, id).await?;
        account.name = name;
        account.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_account(&account).await?;
        Ok(account)
    }

    /// Remove the account row; the facade cascades transactions beforehand
    pub(crate) async fn delete_row(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.get_required(owner, id).await?;
        self.storage.delete_account(id).await
    }
}
