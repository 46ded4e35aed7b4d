//! Conflict detection between account commitments.
//!
//! An account may sit in the account-set of at most one Active listing, and
//! an account pledged as payment in a Pending offer is committed the same
//! way. The guard answers "is this set free of overlap?" by a read-only
//! scan; it never mutates anything. Advisory callers (e.g., the game-session
//! login flow) tolerate staleness — settlement re-validates under its own
//! transaction.

use realmtrade_types::{AccountId, Listing};

use crate::book::ListingBook;

/// Read-only overlap checker over Active listings and Pending offers.
pub struct ConflictGuard<'a> {
    book: &'a ListingBook,
}

impl<'a> ConflictGuard<'a> {
    /// Create a guard over the given book.
    #[must_use]
    pub fn new(book: &'a ListingBook) -> Self {
        Self { book }
    }

    /// Whether any queried account is already committed to an Active
    /// listing or a Pending offer.
    #[must_use]
    pub fn has_conflict(&self, account_ids: &[AccountId]) -> bool {
        !self.conflicting_ids(account_ids).is_empty()
    }

    /// The subset of queried accounts that are already committed, in query
    /// order.
    #[must_use]
    pub fn conflicting_ids(&self, account_ids: &[AccountId]) -> Vec<AccountId> {
        let active = self.book.active_listings();
        let pending = self.book.pending_offers();
        account_ids
            .iter()
            .copied()
            .filter(|&id| {
                active.iter().any(|l| l.contains(id))
                    || pending.iter().any(|o| o.contains(id))
            })
            .collect()
    }

    /// The Active listing whose account-set contains `account_id`, if any.
    /// This is the listing a caller must cancel before using the account
    /// elsewhere (e.g., logging it into a game session).
    #[must_use]
    pub fn blocking_listing(&self, account_id: AccountId) -> Option<&'a Listing> {
        self.book
            .active_listings()
            .into_iter()
            .find(|l| l.contains(account_id))
    }
}
