//! Custody invariant audits.
//!
//! Invariants enforced by construction are still cheap to re-verify:
//! ```text
//! ∀ active listings L1 ≠ L2: accounts(L1) ∩ accounts(L2) = ∅
//! ∀ active listing L, ∀ a ∈ accounts(L): owner(a) == seller(L)
//! ```
//! If either audit fails, state has been mutated outside the coordinator's
//! transaction — treat it as a defect, not a user error.

use std::collections::HashMap;

use realmtrade_market::ListingBook;
use realmtrade_registry::AccountDirectory;
use realmtrade_types::{AccountId, ListingId, MarketError, Result};

/// Verify that the account-sets of all Active listings are pairwise
/// disjoint.
///
/// # Errors
/// Returns [`MarketError::OwnershipInvariantViolation`] naming the first
/// doubly-committed account.
pub fn verify_active_disjoint(book: &ListingBook) -> Result<()> {
    let mut seen: HashMap<AccountId, ListingId> = HashMap::new();
    for listing in book.active_listings() {
        for &account_id in &listing.account_ids {
            if let Some(previous) = seen.insert(account_id, listing.id) {
                return Err(MarketError::OwnershipInvariantViolation {
                    reason: format!(
                        "account {account_id} appears in active listings {previous} and {}",
                        listing.id
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Verify that every account in an Active listing exists and is still owned
/// by the listing's seller.
///
/// # Errors
/// Returns [`MarketError::OwnershipInvariantViolation`] naming the first
/// mismatch.
pub fn verify_listing_custody<D: AccountDirectory>(
    directory: &D,
    book: &ListingBook,
) -> Result<()> {
    for listing in book.active_listings() {
        for &account_id in &listing.account_ids {
            match directory.owner_of(account_id) {
                None => {
                    return Err(MarketError::OwnershipInvariantViolation {
                        reason: format!(
                            "account {account_id} in active listing {} is missing from the directory",
                            listing.id
                        ),
                    });
                }
                Some(owner) if owner != listing.seller_id => {
                    return Err(MarketError::OwnershipInvariantViolation {
                        reason: format!(
                            "account {account_id} in active listing {} is owned by {owner}, not the seller",
                            listing.id
                        ),
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
