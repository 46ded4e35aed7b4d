//! In-memory account directory.
//!
//! The reference implementation of [`AccountDirectory`], backed by a plain
//! `HashMap`. Used by tests and development; a production deployment plugs a
//! persistent implementation into the same trait.

use std::collections::HashMap;

use realmtrade_types::{Account, AccountId, Inventory, MarketError, Result, UserId};

use crate::directory::AccountDirectory;

/// HashMap-backed account store.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    accounts: HashMap<AccountId, Account>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }
}

impl AccountDirectory for MemoryDirectory {
    fn insert(&mut self, account: Account) {
        tracing::debug!(account = %account.id, owner = %account.owner_id, "Account registered");
        self.accounts.insert(account.id, account);
    }

    fn get(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).cloned()
    }

    fn owner_of(&self, id: AccountId) -> Option<UserId> {
        self.accounts.get(&id).map(|a| a.owner_id)
    }

    fn accounts_owned_by(&self, owner: UserId) -> Vec<Account> {
        let mut owned: Vec<Account> = self
            .accounts
            .values()
            .filter(|a| a.owner_id == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|a| a.id);
        owned
    }

    fn set_owner(&mut self, id: AccountId, new_owner: UserId) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(MarketError::AccountNotFound(id))?;
        account.owner_id = new_owner;
        Ok(())
    }

    fn set_inventory(
        &mut self,
        id: AccountId,
        inventory: Inventory,
        seasonal: bool,
    ) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(MarketError::AccountNotFound(id))?;
        account.inventory = inventory;
        account.seasonal = seasonal;
        Ok(())
    }

    fn set_verified(&mut self, id: AccountId) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(MarketError::AccountNotFound(id))?;
        account.verified = true;
        Ok(())
    }

    fn remove_unverified(&mut self, owner: UserId) -> usize {
        let before = self.accounts.len();
        self.accounts
            .retain(|_, a| a.owner_id != owner || a.verified);
        before - self.accounts.len()
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
}
