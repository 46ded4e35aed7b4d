//! The settlement transaction coordinator.
//!
//! Every caller-facing operation goes through here. Mutating operations
//! take the write guard for their full duration, so precondition checks,
//! custody transfers, and the listing-status transition all act on one
//! consistent snapshot — a stale read can never slip between check and
//! commit. The coordinator is the only component that changes account
//! ownership.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use realmtrade_market::{Marketplace, aggregate_shortfall, allocate};
use realmtrade_registry::AccountDirectory;
use realmtrade_types::{
    Account, AccountId, Inventory, Listing, ListingId, MarketError, Offer, OfferId, Price, Result,
    SettlementReceipt, UserId,
};

/// Top-level entry point for the marketplace engine.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Debug)]
pub struct SettlementCoordinator<D> {
    state: Arc<RwLock<Marketplace<D>>>,
}

impl<D> Clone for SettlementCoordinator<D> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<D: AccountDirectory> SettlementCoordinator<D> {
    /// Wrap a marketplace into a shareable coordinator.
    #[must_use]
    pub fn new(marketplace: Marketplace<D>) -> Self {
        Self {
            state: Arc::new(RwLock::new(marketplace)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Marketplace<D>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Marketplace<D>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------
    // Registry passthroughs (external collaborator flows)
    // -----------------------------------------------------------------

    /// Register an account into the directory.
    pub fn register_account(&self, account: Account) {
        self.write().directory_mut().insert(account);
    }

    /// Overwrite an account's inventory snapshot (inventory-sync flow).
    pub fn refresh_inventory(
        &self,
        account_id: AccountId,
        inventory: Inventory,
        seasonal: bool,
    ) -> Result<()> {
        self.write()
            .directory_mut()
            .set_inventory(account_id, inventory, seasonal)
    }

    /// Mark an account as verified (registration flow).
    pub fn verify_account(&self, account_id: AccountId) -> Result<()> {
        self.write().directory_mut().set_verified(account_id)
    }

    /// Drop all unverified accounts of `owner`, returning how many were
    /// removed (stale registration cleanup).
    pub fn purge_unverified(&self, owner: UserId) -> usize {
        self.write().directory_mut().remove_unverified(owner)
    }

    // -----------------------------------------------------------------
    // Lifecycle operations (delegated under the same lock)
    // -----------------------------------------------------------------

    /// Create a listing. See [`Marketplace::create_listing`].
    pub fn create_listing(
        &self,
        seller_id: UserId,
        account_ids: Vec<AccountId>,
        price: Price,
    ) -> Result<ListingId> {
        self.write().create_listing(seller_id, account_ids, price)
    }

    /// Cancel a listing. See [`Marketplace::cancel_listing`].
    pub fn cancel_listing(&self, listing_id: ListingId, caller_id: UserId) -> Result<()> {
        self.write().cancel_listing(listing_id, caller_id)
    }

    /// Submit an offer. See [`Marketplace::make_offer`].
    pub fn make_offer(
        &self,
        listing_id: ListingId,
        buyer_id: UserId,
        account_ids: Vec<AccountId>,
    ) -> Result<OfferId> {
        self.write().make_offer(listing_id, buyer_id, account_ids)
    }

    /// Reject a pending offer. See [`Marketplace::reject_offer`].
    pub fn reject_offer(&self, offer_id: OfferId, caller_id: UserId) -> Result<()> {
        self.write().reject_offer(offer_id, caller_id)
    }

    // -----------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------

    /// Accept a listing as `caller_id`, paying either with an explicit
    /// account set (counter-offer path) or with accounts chosen by the
    /// allocator over everything the caller owns (direct path).
    ///
    /// Preconditions, first failure wins:
    /// 1. listing exists and is Active
    /// 2. the caller is not the seller
    /// 3. explicit accounts are owned by the caller, or the caller's
    ///    aggregate holdings cover the price
    ///
    /// On success every listed account belongs to the caller, every payment
    /// account belongs to the seller, and the listing is Completed — or
    /// none of that happened.
    pub fn accept_listing(
        &self,
        listing_id: ListingId,
        caller_id: UserId,
        explicit_payment: Option<Vec<AccountId>>,
    ) -> Result<SettlementReceipt> {
        let mut mp = self.write();
        Self::settle(&mut mp, listing_id, caller_id, explicit_payment)
    }

    /// Seller-side acceptance of a pending offer: settles the offer's
    /// listing using the offer's account set as payment and marks the offer
    /// Accepted, all in one transaction.
    pub fn accept_offer(&self, offer_id: OfferId, caller_id: UserId) -> Result<SettlementReceipt> {
        let mut mp = self.write();

        let offer = mp
            .book()
            .offer(offer_id)
            .ok_or(MarketError::OfferNotFound(offer_id))?;
        if !offer.is_pending() {
            return Err(MarketError::OfferNotPending(offer_id));
        }
        let listing_id = offer.listing_id;
        let buyer_id = offer.buyer_id;
        let payment = offer.account_ids.clone();

        let listing = mp
            .book()
            .listing(listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if listing.seller_id != caller_id {
            return Err(MarketError::NotListingSeller(listing_id));
        }

        let receipt = Self::settle(&mut mp, listing_id, buyer_id, Some(payment))?;
        mp.book_mut()
            .offer_mut(offer_id)
            .ok_or(MarketError::OfferNotFound(offer_id))?
            .mark_accepted()?;
        Ok(receipt)
    }

    /// The settlement transaction body. `mp` is the exclusive guard the
    /// caller already holds; nothing outside this borrow can observe an
    /// intermediate state.
    fn settle(
        mp: &mut Marketplace<D>,
        listing_id: ListingId,
        buyer_id: UserId,
        explicit_payment: Option<Vec<AccountId>>,
    ) -> Result<SettlementReceipt> {
        // 1. Listing exists and is Active.
        let listing = mp
            .book()
            .listing(listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if !listing.is_active() {
            return Err(MarketError::ListingNotActive(listing_id));
        }
        let seller_id = listing.seller_id;
        let sale_accounts = listing.account_ids.clone();
        let price = listing.price.clone();

        // 2. A seller cannot buy their own listing.
        if buyer_id == seller_id {
            return Err(MarketError::CannotAcceptOwnListing);
        }

        // 3. Resolve the payment set.
        let payment = match explicit_payment {
            Some(account_ids) => {
                let account_ids = dedupe(account_ids);
                let not_owned: Vec<AccountId> = account_ids
                    .iter()
                    .copied()
                    .filter(|&id| mp.directory().owner_of(id) != Some(buyer_id))
                    .collect();
                if !not_owned.is_empty() {
                    return Err(MarketError::AccountsNotOwned {
                        account_ids: not_owned,
                    });
                }
                account_ids
            }
            None => {
                let holdings = mp.directory().accounts_owned_by(buyer_id);
                // Aggregate pre-check so the error carries the true
                // per-item deficit, not an artifact of the greedy walk.
                if let Some(shortfall) = aggregate_shortfall(&holdings, &price) {
                    return Err(MarketError::InsufficientItems {
                        item_type: shortfall.item_type,
                        held: shortfall.held,
                        required: shortfall.required,
                    });
                }
                allocate(&holdings, &price)?
            }
        };

        // 4. Custody transfers, undo-logged, then the conditional status
        //    transition. The guard makes the whole block indivisible.
        let mut undo: Vec<(AccountId, UserId)> = Vec::new();

        for &account_id in &sale_accounts {
            if let Err(err) = transfer(mp, account_id, buyer_id, &mut undo) {
                rollback(mp, &undo);
                return Err(err);
            }
        }
        for &account_id in &payment {
            if let Err(err) = transfer(mp, account_id, seller_id, &mut undo) {
                rollback(mp, &undo);
                return Err(err);
            }
        }

        if let Err(err) = mp.book_mut().complete_if_active(listing_id) {
            rollback(mp, &undo);
            return Err(err);
        }

        let receipt =
            SettlementReceipt::new(listing_id, seller_id, buyer_id, sale_accounts, payment);
        tracing::info!(
            listing = %listing_id,
            seller = %seller_id,
            buyer = %buyer_id,
            to_buyer = receipt.accounts_to_buyer.len(),
            to_seller = receipt.accounts_to_seller.len(),
            digest = %receipt.digest_hex(),
            "Settlement committed"
        );
        Ok(receipt)
    }

    /// Run both custody audits (active-listing disjointness, seller custody
    /// of listed accounts) against the current state.
    pub fn verify_invariants(&self) -> Result<()> {
        let mp = self.read();
        crate::audit::verify_active_disjoint(mp.book())?;
        crate::audit::verify_listing_custody(mp.directory(), mp.book())
    }

    // -----------------------------------------------------------------
    // Queries (read guard; snapshots by clone)
    // -----------------------------------------------------------------

    /// Snapshot of all Active listings, ascending by id.
    #[must_use]
    pub fn active_listings(&self) -> Vec<Listing> {
        self.read()
            .book()
            .active_listings()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Snapshot of one listing.
    #[must_use]
    pub fn listing(&self, listing_id: ListingId) -> Option<Listing> {
        self.read().book().listing(listing_id).cloned()
    }

    /// Snapshot of one offer.
    #[must_use]
    pub fn offer(&self, offer_id: OfferId) -> Option<Offer> {
        self.read().book().offer(offer_id).cloned()
    }

    /// Snapshot of the pending offers against a listing, ascending by id.
    #[must_use]
    pub fn pending_offers_for(&self, listing_id: ListingId) -> Vec<Offer> {
        self.read()
            .book()
            .pending_offers_for(listing_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The Active listing blocking an account from unrelated use, if any.
    #[must_use]
    pub fn session_conflict(&self, account_id: AccountId) -> Option<Listing> {
        self.read().session_conflict(account_id).cloned()
    }

    /// Snapshot of one account.
    #[must_use]
    pub fn account(&self, account_id: AccountId) -> Option<Account> {
        self.read().directory().get(account_id)
    }

    /// Snapshot of everything `owner` owns, ascending by id.
    #[must_use]
    pub fn accounts_owned_by(&self, owner: UserId) -> Vec<Account> {
        self.read().accounts_owned_by(owner)
    }
}

/// Reassign one account, recording the previous owner for rollback.
fn transfer<D: AccountDirectory>(
    mp: &mut Marketplace<D>,
    account_id: AccountId,
    new_owner: UserId,
    undo: &mut Vec<(AccountId, UserId)>,
) -> Result<()> {
    let previous = mp.directory().owner_of(account_id).ok_or_else(|| {
        MarketError::SettlementFailed {
            reason: format!("account {account_id} missing from directory"),
        }
    })?;
    mp.directory_mut()
        .set_owner(account_id, new_owner)
        .map_err(|err| MarketError::SettlementFailed {
            reason: err.to_string(),
        })?;
    undo.push((account_id, previous));
    Ok(())
}

/// Restore previous owners in reverse application order.
fn rollback<D: AccountDirectory>(mp: &mut Marketplace<D>, undo: &[(AccountId, UserId)]) {
    for &(account_id, owner) in undo.iter().rev() {
        if mp.directory_mut().set_owner(account_id, owner).is_err() {
            tracing::warn!(account = %account_id, "Rollback could not restore previous owner");
        }
    }
}

fn dedupe(account_ids: Vec<AccountId>) -> Vec<AccountId> {
    let mut seen = std::collections::HashSet::new();
    account_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect()
}
