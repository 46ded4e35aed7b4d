//! The listing/offer book.
//!
//! Holds every listing and offer ever created (records are never deleted,
//! only transitioned). The status transition helpers re-check state on the
//! record itself, so a caller holding a stale view cannot force an invalid
//! transition — [`ListingBook::complete_if_active`] is the conditional
//! update settlement relies on.

use std::collections::HashMap;

use realmtrade_types::{Listing, ListingId, MarketError, Offer, OfferId, Result};

/// In-memory table of listings and offers.
#[derive(Debug, Default)]
pub struct ListingBook {
    listings: HashMap<ListingId, Listing>,
    offers: HashMap<OfferId, Offer>,
}

impl ListingBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: HashMap::new(),
            offers: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------

    /// Record a new listing.
    pub fn insert_listing(&mut self, listing: Listing) {
        self.listings.insert(listing.id, listing);
    }

    /// Look up a listing by id.
    #[must_use]
    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.listings.get(&id)
    }

    /// All Active listings, ascending by id.
    #[must_use]
    pub fn active_listings(&self) -> Vec<&Listing> {
        let mut active: Vec<&Listing> =
            self.listings.values().filter(|l| l.is_active()).collect();
        active.sort_by_key(|l| l.id);
        active
    }

    /// Conditionally transition a listing `Active → Completed`.
    ///
    /// The status check and the write happen on the live record in one
    /// step; a listing that is no longer Active fails here no matter what
    /// the caller previously observed.
    ///
    /// # Errors
    /// - [`MarketError::ListingNotFound`] if the listing does not exist
    /// - [`MarketError::ListingNotActive`] if the listing is not Active
    pub fn complete_if_active(&mut self, id: ListingId) -> Result<()> {
        let listing = self
            .listings
            .get_mut(&id)
            .ok_or(MarketError::ListingNotFound(id))?;
        listing.mark_completed()
    }

    /// Conditionally transition a listing `Active → Cancelled`.
    ///
    /// # Errors
    /// - [`MarketError::ListingNotFound`] if the listing does not exist
    /// - [`MarketError::ListingNotActive`] if the listing is not Active
    pub fn cancel_if_active(&mut self, id: ListingId) -> Result<()> {
        let listing = self
            .listings
            .get_mut(&id)
            .ok_or(MarketError::ListingNotFound(id))?;
        listing.mark_cancelled()
    }

    /// Number of listings recorded (any status).
    #[must_use]
    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    // -----------------------------------------------------------------
    // Offers
    // -----------------------------------------------------------------

    /// Record a new offer.
    pub fn insert_offer(&mut self, offer: Offer) {
        self.offers.insert(offer.id, offer);
    }

    /// Look up an offer by id.
    #[must_use]
    pub fn offer(&self, id: OfferId) -> Option<&Offer> {
        self.offers.get(&id)
    }

    /// Mutable offer access for status transitions.
    pub fn offer_mut(&mut self, id: OfferId) -> Option<&mut Offer> {
        self.offers.get_mut(&id)
    }

    /// All Pending offers, ascending by id.
    #[must_use]
    pub fn pending_offers(&self) -> Vec<&Offer> {
        let mut pending: Vec<&Offer> =
            self.offers.values().filter(|o| o.is_pending()).collect();
        pending.sort_by_key(|o| o.id);
        pending
    }

    /// Pending offers targeting one listing, ascending by id.
    #[must_use]
    pub fn pending_offers_for(&self, listing_id: ListingId) -> Vec<&Offer> {
        let mut pending: Vec<&Offer> = self
            .offers
            .values()
            .filter(|o| o.is_pending() && o.listing_id == listing_id)
            .collect();
        pending.sort_by_key(|o| o.id);
        pending
    }

    /// Number of offers recorded (any status).
    #[must_use]
    pub fn offer_count(&self) -> usize {
        self.offers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realmtrade_types::{AccountId, Price, UserId};

    fn make_listing() -> Listing {
        Listing::new(UserId::new(), vec![AccountId::new()], Price::free())
    }

    #[test]
    fn insert_and_lookup_listing() {
        let mut book = ListingBook::new();
        let listing = make_listing();
        let id = listing.id;
        book.insert_listing(listing);
        assert!(book.listing(id).is_some());
        assert_eq!(book.listing_count(), 1);
    }

    #[test]
    fn complete_if_active_succeeds_once() {
        let mut book = ListingBook::new();
        let listing = make_listing();
        let id = listing.id;
        book.insert_listing(listing);

        book.complete_if_active(id).unwrap();
        let err = book.complete_if_active(id).unwrap_err();
        assert!(matches!(err, MarketError::ListingNotActive(l) if l == id));
    }

    #[test]
    fn cancel_after_complete_blocked() {
        let mut book = ListingBook::new();
        let listing = make_listing();
        let id = listing.id;
        book.insert_listing(listing);

        book.complete_if_active(id).unwrap();
        assert!(book.cancel_if_active(id).is_err());
    }

    #[test]
    fn complete_unknown_listing_fails() {
        let mut book = ListingBook::new();
        let id = ListingId::new();
        let err = book.complete_if_active(id).unwrap_err();
        assert!(matches!(err, MarketError::ListingNotFound(l) if l == id));
    }

    #[test]
    fn active_listings_excludes_terminal() {
        let mut book = ListingBook::new();
        let keep = make_listing();
        let done = make_listing();
        let done_id = done.id;
        book.insert_listing(keep);
        book.insert_listing(done);
        book.complete_if_active(done_id).unwrap();

        let active = book.active_listings();
        assert_eq!(active.len(), 1);
        assert_ne!(active[0].id, done_id);
    }

    #[test]
    fn pending_offers_filtered_by_listing() {
        let mut book = ListingBook::new();
        let l1 = ListingId::new();
        let l2 = ListingId::new();
        book.insert_offer(Offer::new(l1, UserId::new(), vec![]));
        book.insert_offer(Offer::new(l1, UserId::new(), vec![]));
        book.insert_offer(Offer::new(l2, UserId::new(), vec![]));

        assert_eq!(book.pending_offers_for(l1).len(), 2);
        assert_eq!(book.pending_offers_for(l2).len(), 1);
        assert_eq!(book.pending_offers().len(), 3);
    }

    #[test]
    fn rejected_offer_leaves_pending_set() {
        let mut book = ListingBook::new();
        let listing_id = ListingId::new();
        let offer = Offer::new(listing_id, UserId::new(), vec![]);
        let offer_id = offer.id;
        book.insert_offer(offer);

        book.offer_mut(offer_id).unwrap().mark_rejected().unwrap();
        assert!(book.pending_offers_for(listing_id).is_empty());
        assert_eq!(book.offer_count(), 1);
    }
}
