//! The marketplace aggregate: directory + book behind one validation front.
//!
//! All creation-time rules live here (ownership, conflicts, limits), so a
//! listing or offer that makes it into the book is well-formed by
//! construction. Custody never changes in this crate — settlement does that.

use realmtrade_registry::AccountDirectory;
use realmtrade_types::{
    Account, AccountId, Listing, ListingId, MarketError, MarketplaceConfig, Offer, OfferId, Price,
    Result, UserId,
};

use crate::book::ListingBook;
use crate::conflict::ConflictGuard;

/// Shared marketplace state: the account directory and the listing/offer
/// book, validated as one unit.
#[derive(Debug)]
pub struct Marketplace<D> {
    directory: D,
    book: ListingBook,
    config: MarketplaceConfig,
}

impl<D: AccountDirectory> Marketplace<D> {
    /// Create a marketplace over the given directory with default limits.
    #[must_use]
    pub fn new(directory: D) -> Self {
        Self::with_config(directory, MarketplaceConfig::default())
    }

    /// Create a marketplace with explicit limits.
    #[must_use]
    pub fn with_config(directory: D, config: MarketplaceConfig) -> Self {
        Self {
            directory,
            book: ListingBook::new(),
            config,
        }
    }

    /// Read access to the account directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Mutable access to the account directory (registration, inventory
    /// sync, verification — the flows owned by external collaborators).
    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    /// Read access to the listing/offer book.
    pub fn book(&self) -> &ListingBook {
        &self.book
    }

    /// Mutable access to the book. Intended for the settlement transaction;
    /// everything else goes through the validated operations below.
    pub fn book_mut(&mut self) -> &mut ListingBook {
        &mut self.book
    }

    // -----------------------------------------------------------------
    // Listing lifecycle
    // -----------------------------------------------------------------

    /// Create a listing selling `account_ids` for `price`.
    ///
    /// # Errors
    /// - [`MarketError::InvalidAccountSet`] on an empty or oversized set
    /// - [`MarketError::InvalidPrice`] on an oversized price
    /// - [`MarketError::AccountsNotOwned`] if the seller does not own every
    ///   account (unknown accounts count as not owned)
    /// - [`MarketError::ListingConflict`] if any account is already
    ///   committed to an Active listing or a Pending offer
    pub fn create_listing(
        &mut self,
        seller_id: UserId,
        account_ids: Vec<AccountId>,
        price: Price,
    ) -> Result<ListingId> {
        let account_ids = dedupe(account_ids);
        if account_ids.is_empty() {
            return Err(MarketError::InvalidAccountSet {
                reason: "a listing must sell at least one account".to_string(),
            });
        }
        if account_ids.len() > self.config.max_accounts_per_listing {
            return Err(MarketError::InvalidAccountSet {
                reason: format!(
                    "at most {} accounts per listing",
                    self.config.max_accounts_per_listing
                ),
            });
        }
        if price.len() > self.config.max_price_items {
            return Err(MarketError::InvalidPrice {
                reason: format!("at most {} price lines", self.config.max_price_items),
            });
        }

        self.ensure_owned(seller_id, &account_ids)?;

        let conflicting = ConflictGuard::new(&self.book).conflicting_ids(&account_ids);
        if !conflicting.is_empty() {
            return Err(MarketError::ListingConflict {
                account_ids: conflicting,
            });
        }

        let listing = Listing::new(seller_id, account_ids, price);
        let listing_id = listing.id;
        tracing::info!(
            listing = %listing_id,
            seller = %seller_id,
            accounts = listing.account_ids.len(),
            price = %listing.price,
            "Listing created"
        );
        self.book.insert_listing(listing);
        Ok(listing_id)
    }

    /// Cancel a listing. Seller-only; only Active listings can be cancelled.
    ///
    /// # Errors
    /// - [`MarketError::ListingNotFound`] if the listing does not exist
    /// - [`MarketError::NotListingSeller`] if the caller is not the seller
    /// - [`MarketError::ListingNotActive`] if the listing is terminal
    pub fn cancel_listing(&mut self, listing_id: ListingId, caller_id: UserId) -> Result<()> {
        let listing = self
            .book
            .listing(listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if listing.seller_id != caller_id {
            return Err(MarketError::NotListingSeller(listing_id));
        }
        self.book.cancel_if_active(listing_id)?;
        tracing::info!(listing = %listing_id, seller = %caller_id, "Listing cancelled");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Offer lifecycle
    // -----------------------------------------------------------------

    /// Submit an offer of `account_ids` as payment for a listing. Records a
    /// Pending offer; moves no ownership.
    ///
    /// # Errors
    /// - [`MarketError::ListingNotFound`] / [`MarketError::ListingNotActive`]
    /// - [`MarketError::CannotOfferOnOwnListing`] if the buyer is the seller
    /// - [`MarketError::InvalidAccountSet`] on an oversized set
    /// - [`MarketError::AccountsNotOwned`] if the buyer does not own every
    ///   offered account
    /// - [`MarketError::ListingConflict`] if any offered account is already
    ///   committed elsewhere
    pub fn make_offer(
        &mut self,
        listing_id: ListingId,
        buyer_id: UserId,
        account_ids: Vec<AccountId>,
    ) -> Result<OfferId> {
        let listing = self
            .book
            .listing(listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if !listing.is_active() {
            return Err(MarketError::ListingNotActive(listing_id));
        }
        if listing.seller_id == buyer_id {
            return Err(MarketError::CannotOfferOnOwnListing);
        }

        let account_ids = dedupe(account_ids);
        if account_ids.len() > self.config.max_accounts_per_offer {
            return Err(MarketError::InvalidAccountSet {
                reason: format!(
                    "at most {} accounts per offer",
                    self.config.max_accounts_per_offer
                ),
            });
        }

        self.ensure_owned(buyer_id, &account_ids)?;

        let conflicting = ConflictGuard::new(&self.book).conflicting_ids(&account_ids);
        if !conflicting.is_empty() {
            return Err(MarketError::ListingConflict {
                account_ids: conflicting,
            });
        }

        let offer = Offer::new(listing_id, buyer_id, account_ids);
        let offer_id = offer.id;
        tracing::info!(
            offer = %offer_id,
            listing = %listing_id,
            buyer = %buyer_id,
            accounts = offer.account_ids.len(),
            "Offer submitted"
        );
        self.book.insert_offer(offer);
        Ok(offer_id)
    }

    /// Reject a pending offer. Seller-only.
    ///
    /// # Errors
    /// - [`MarketError::OfferNotFound`] if the offer does not exist
    /// - [`MarketError::ListingNotFound`] if its listing is gone
    /// - [`MarketError::NotListingSeller`] if the caller is not the seller
    /// - [`MarketError::OfferNotPending`] if the offer is terminal
    pub fn reject_offer(&mut self, offer_id: OfferId, caller_id: UserId) -> Result<()> {
        let offer = self
            .book
            .offer(offer_id)
            .ok_or(MarketError::OfferNotFound(offer_id))?;
        let listing_id = offer.listing_id;
        let listing = self
            .book
            .listing(listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if listing.seller_id != caller_id {
            return Err(MarketError::NotListingSeller(listing_id));
        }
        self.book
            .offer_mut(offer_id)
            .ok_or(MarketError::OfferNotFound(offer_id))?
            .mark_rejected()?;
        tracing::info!(offer = %offer_id, listing = %listing_id, "Offer rejected");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// The Active listing blocking `account_id` from unrelated use (e.g., a
    /// game-session login), if any. Advisory: tolerates staleness.
    #[must_use]
    pub fn session_conflict(&self, account_id: AccountId) -> Option<&Listing> {
        ConflictGuard::new(&self.book).blocking_listing(account_id)
    }

    /// All accounts currently owned by `owner`, ascending by id.
    #[must_use]
    pub fn accounts_owned_by(&self, owner: UserId) -> Vec<Account> {
        self.directory.accounts_owned_by(owner)
    }

    fn ensure_owned(&self, owner: UserId, account_ids: &[AccountId]) -> Result<()> {
        let not_owned: Vec<AccountId> = account_ids
            .iter()
            .copied()
            .filter(|&id| self.directory.owner_of(id) != Some(owner))
            .collect();
        if not_owned.is_empty() {
            Ok(())
        } else {
            Err(MarketError::AccountsNotOwned {
                account_ids: not_owned,
            })
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

#[cfg(test)]
mod tests {
    use super::*;
    use realmtrade_registry::MemoryDirectory;
    use realmtrade_types::RequiredItem;

    fn setup() -> (Marketplace<MemoryDirectory>, UserId, AccountId) {
        let mut directory = MemoryDirectory::new();
        let seller = UserId::new();
        let account = Account::dummy(seller, "Herald", &["Sword"]);
        let account_id = account.id;
        directory.insert(account);
        (Marketplace::new(directory), seller, account_id)
    }

    fn potion_price() -> Price {
        Price::new(vec![RequiredItem::new("Potion of Attack", 2)]).unwrap()
    }

    #[test]
    fn create_listing_happy_path() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();
        let listing = market.book().listing(listing_id).unwrap();
        assert!(listing.is_active());
        assert_eq!(listing.account_ids, vec![account_id]);
    }

    #[test]
    fn create_listing_rejects_empty_set() {
        let (mut market, seller, _) = setup();
        let err = market
            .create_listing(seller, vec![], potion_price())
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidAccountSet { .. }));
    }

    #[test]
    fn create_listing_rejects_foreign_account() {
        let (mut market, _, account_id) = setup();
        let stranger = UserId::new();
        let err = market
            .create_listing(stranger, vec![account_id], potion_price())
            .unwrap_err();
        assert!(
            matches!(err, MarketError::AccountsNotOwned { account_ids } if account_ids == vec![account_id])
        );
    }

    #[test]
    fn create_listing_rejects_unknown_account() {
        let (mut market, seller, _) = setup();
        let ghost = AccountId::new();
        let err = market
            .create_listing(seller, vec![ghost], potion_price())
            .unwrap_err();
        assert!(matches!(err, MarketError::AccountsNotOwned { .. }));
    }

    #[test]
    fn create_listing_rejects_double_commit() {
        let (mut market, seller, account_id) = setup();
        market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();
        let err = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap_err();
        assert!(
            matches!(err, MarketError::ListingConflict { account_ids } if account_ids == vec![account_id])
        );
    }

    #[test]
    fn cancelled_listing_frees_accounts_for_relisting() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();
        market.cancel_listing(listing_id, seller).unwrap();
        assert!(
            market
                .create_listing(seller, vec![account_id], potion_price())
                .is_ok()
        );
    }

    #[test]
    fn cancel_by_non_seller_rejected() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();
        let stranger = UserId::new();
        let err = market.cancel_listing(listing_id, stranger).unwrap_err();
        assert!(matches!(err, MarketError::NotListingSeller(id) if id == listing_id));
    }

    #[test]
    fn cancel_twice_rejected_not_idempotent_success() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();
        market.cancel_listing(listing_id, seller).unwrap();
        let err = market.cancel_listing(listing_id, seller).unwrap_err();
        assert!(matches!(err, MarketError::ListingNotActive(id) if id == listing_id));
    }

    #[test]
    fn make_offer_happy_path() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();

        let buyer = UserId::new();
        let pay = Account::dummy(buyer, "PayAcc", &["Potion of Attack", "Potion of Attack"]);
        let pay_id = pay.id;
        market.directory_mut().insert(pay);

        let offer_id = market.make_offer(listing_id, buyer, vec![pay_id]).unwrap();
        let offer = market.book().offer(offer_id).unwrap();
        assert!(offer.is_pending());
        assert_eq!(offer.account_ids, vec![pay_id]);
    }

    #[test]
    fn make_offer_on_own_listing_rejected() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();

        let other = Account::dummy(seller, "Other", &[]);
        let other_id = other.id;
        market.directory_mut().insert(other);

        let err = market
            .make_offer(listing_id, seller, vec![other_id])
            .unwrap_err();
        assert!(matches!(err, MarketError::CannotOfferOnOwnListing));
    }

    #[test]
    fn make_offer_with_unowned_account_rejected() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();
        let buyer = UserId::new();
        let err = market
            .make_offer(listing_id, buyer, vec![account_id])
            .unwrap_err();
        assert!(matches!(err, MarketError::AccountsNotOwned { .. }));
    }

    #[test]
    fn pledged_account_cannot_be_pledged_twice() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();

        let seller2 = UserId::new();
        let second = Account::dummy(seller2, "Second", &["Bow"]);
        let second_id = second.id;
        market.directory_mut().insert(second);
        let listing2 = market
            .create_listing(seller2, vec![second_id], Price::free())
            .unwrap();

        let buyer = UserId::new();
        let pay = Account::dummy(buyer, "PayAcc", &["Potion of Attack"]);
        let pay_id = pay.id;
        market.directory_mut().insert(pay);

        market.make_offer(listing_id, buyer, vec![pay_id]).unwrap();
        let err = market.make_offer(listing2, buyer, vec![pay_id]).unwrap_err();
        assert!(matches!(err, MarketError::ListingConflict { .. }));
    }

    #[test]
    fn reject_offer_is_seller_only_and_terminal() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();

        let buyer = UserId::new();
        let pay = Account::dummy(buyer, "PayAcc", &["Potion of Attack"]);
        let pay_id = pay.id;
        market.directory_mut().insert(pay);
        let offer_id = market.make_offer(listing_id, buyer, vec![pay_id]).unwrap();

        let err = market.reject_offer(offer_id, buyer).unwrap_err();
        assert!(matches!(err, MarketError::NotListingSeller(_)));

        market.reject_offer(offer_id, seller).unwrap();
        let err = market.reject_offer(offer_id, seller).unwrap_err();
        assert!(matches!(err, MarketError::OfferNotPending(id) if id == offer_id));
    }

    #[test]
    fn session_conflict_points_at_blocking_listing() {
        let (mut market, seller, account_id) = setup();
        let listing_id = market
            .create_listing(seller, vec![account_id], potion_price())
            .unwrap();

        let blocking = market.session_conflict(account_id).unwrap();
        assert_eq!(blocking.id, listing_id);

        market.cancel_listing(listing_id, seller).unwrap();
        assert!(market.session_conflict(account_id).is_none());
    }
}
