//! The account-directory contract.
//!
//! Mirrors the two halves of the external collaborator: queries (current
//! owner, inventory snapshots) and mutations (custody transfer, inventory
//! sync, verification lifecycle). The engine is synchronous per request, so
//! the contract is a plain sync trait.

use realmtrade_types::{Account, AccountId, Inventory, Result, UserId};

/// Read/write façade over the account directory.
///
/// Implementations must uphold:
/// - every stored account has exactly one owner at all times;
/// - [`accounts_owned_by`](Self::accounts_owned_by) returns accounts in
///   ascending [`AccountId`] order — this is the canonical allocation order
///   the settlement coordinator relies on for determinism.
pub trait AccountDirectory {
    /// Register an account. A second insert with the same id replaces the
    /// record (re-registration after a failed verification attempt).
    fn insert(&mut self, account: Account);

    /// Fetch an account by id.
    fn get(&self, id: AccountId) -> Option<Account>;

    /// Current owner of an account, if it exists.
    fn owner_of(&self, id: AccountId) -> Option<UserId>;

    /// All accounts currently owned by `owner`, ascending by id.
    fn accounts_owned_by(&self, owner: UserId) -> Vec<Account>;

    /// Reassign custody of an account.
    ///
    /// # Errors
    /// Returns [`realmtrade_types::MarketError::AccountNotFound`] if the
    /// account does not exist.
    fn set_owner(&mut self, id: AccountId, new_owner: UserId) -> Result<()>;

    /// Overwrite an account's inventory snapshot and seasonal flag. Called
    /// by the external inventory-sync collaborator.
    ///
    /// # Errors
    /// Returns [`realmtrade_types::MarketError::AccountNotFound`] if the
    /// account does not exist.
    fn set_inventory(&mut self, id: AccountId, inventory: Inventory, seasonal: bool)
    -> Result<()>;

    /// Mark an account as verified.
    ///
    /// # Errors
    /// Returns [`realmtrade_types::MarketError::AccountNotFound`] if the
    /// account does not exist.
    fn set_verified(&mut self, id: AccountId) -> Result<()>;

    /// Drop all unverified accounts belonging to `owner`, returning how many
    /// were removed. Used by the registration flow to clear stale attempts.
    fn remove_unverified(&mut self, owner: UserId) -> usize;

    /// Number of accounts in the directory.
    fn len(&self) -> usize;

    /// Whether the directory is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
