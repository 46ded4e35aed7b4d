//! Game-account records as the marketplace sees them.
//!
//! An [`Account`] is the unit of custody: whole accounts change owner during
//! settlement, items never leave an account mid-trade. Identity and item
//! vocabulary are immutable once verified; only the owner (settlement) and
//! the inventory snapshot (external sync) change after registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Inventory, UserId};

/// A game account registered into the marketplace directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Globally unique account identifier.
    pub id: AccountId,
    /// In-game display name.
    pub name: String,
    /// Current owner. Exactly one at all times.
    pub owner_id: UserId,
    /// Snapshot of the account's item multiset.
    pub inventory: Inventory,
    /// Whether the account is flagged as seasonal in the game.
    pub seasonal: bool,
    /// Whether ownership of the underlying game account has been verified.
    pub verified: bool,
    /// When the account was registered into the marketplace.
    pub registered_at: DateTime<Utc>,
}

impl Account {
    /// Register a new, unverified account for `owner_id`.
    #[must_use]
    pub fn register(owner_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            owner_id,
            inventory: Inventory::new(),
            seasonal: false,
            verified: false,
            registered_at: Utc::now(),
        }
    }

    /// How many of `item_type` this account holds.
    #[must_use]
    pub fn count_of(&self, item_type: &str) -> u32 {
        self.inventory.count(item_type)
    }

    /// Whether `user` is the current owner.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Account {
    /// A verified account pre-loaded with the given flat item sequence.
    pub fn dummy(owner_id: UserId, name: &str, items: &[&str]) -> Self {
        Self {
            id: AccountId::new(),
            name: name.to_string(),
            owner_id,
            inventory: Inventory::from_items(items.iter().copied()),
            seasonal: false,
            verified: true,
            registered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_starts_unverified_and_empty() {
        let owner = UserId::new();
        let account = Account::register(owner, "Herald");
        assert!(!account.verified);
        assert!(account.inventory.is_empty());
        assert!(account.is_owned_by(owner));
    }

    #[test]
    fn count_of_reads_inventory() {
        let account = Account::dummy(UserId::new(), "Herald", &["Sword", "Sword", "Shield"]);
        assert_eq!(account.count_of("Sword"), 2);
        assert_eq!(account.count_of("Bow"), 0);
    }

    #[test]
    fn serde_roundtrip() {
        let account = Account::dummy(UserId::new(), "Herald", &["Sword"]);
        let json = serde_json::to_string(&account).unwrap();
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(account, back);
    }
}
