//! Buyer offers against a listing.
//!
//! An offer proposes a specific set of the buyer's accounts as payment.
//! Submitting an offer never moves ownership — only the settlement
//! coordinator does, when the seller accepts the offer's account set.
//!
//! Transitions are **monotonic**: `Pending → Accepted` as a byproduct of a
//! committed settlement, `Pending → Rejected` by the seller. Both are
//! terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ListingId, MarketError, OfferId, Result, UserId};

/// The lifecycle state of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferStatus {
    /// Awaiting the seller's decision.
    Pending,
    /// The seller settled against this offer's account set. **Irreversible.**
    Accepted,
    /// The seller declined the offer. **Irreversible.**
    Rejected,
}

impl OfferStatus {
    /// Can this status transition to the given target?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Accepted | Self::Rejected)
        )
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// A buyer's proposed payment against a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Globally unique offer identifier.
    pub id: OfferId,
    /// The listing this offer targets.
    pub listing_id: ListingId,
    /// The user proposing the payment.
    pub buyer_id: UserId,
    /// The buyer's accounts offered as payment. Deduped at construction.
    pub account_ids: Vec<AccountId>,
    /// Current lifecycle state.
    pub status: OfferStatus,
    /// When the offer was submitted.
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Construct a new Pending offer. Duplicate account ids are dropped,
    /// first occurrence wins.
    #[must_use]
    pub fn new(listing_id: ListingId, buyer_id: UserId, account_ids: Vec<AccountId>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let account_ids = account_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        Self {
            id: OfferId::new(),
            listing_id,
            buyer_id,
            account_ids,
            status: OfferStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Whether the offer is still awaiting a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }

    /// Whether the offer's account set contains `account_id`.
    #[must_use]
    pub fn contains(&self, account_id: AccountId) -> bool {
        self.account_ids.contains(&account_id)
    }

    /// Attempt the `Pending → Accepted` transition.
    ///
    /// # Errors
    /// Returns [`MarketError::OfferNotPending`] if the offer is not Pending.
    pub fn mark_accepted(&mut self) -> Result<()> {
        if !self.status.can_transition_to(OfferStatus::Accepted) {
            return Err(MarketError::OfferNotPending(self.id));
        }
        self.status = OfferStatus::Accepted;
        Ok(())
    }

    /// Attempt the `Pending → Rejected` transition.
    ///
    /// # Errors
    /// Returns [`MarketError::OfferNotPending`] if the offer is not Pending.
    pub fn mark_rejected(&mut self) -> Result<()> {
        if !self.status.can_transition_to(OfferStatus::Rejected) {
            return Err(MarketError::OfferNotPending(self.id));
        }
        self.status = OfferStatus::Rejected;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_offer() -> Offer {
        Offer::new(ListingId::new(), UserId::new(), vec![AccountId::new()])
    }

    #[test]
    fn new_offer_is_pending() {
        let offer = make_offer();
        assert!(offer.is_pending());
    }

    #[test]
    fn construction_dedupes_accounts() {
        let a = AccountId::new();
        let offer = Offer::new(ListingId::new(), UserId::new(), vec![a, a]);
        assert_eq!(offer.account_ids, vec![a]);
    }

    #[test]
    fn accept_then_reject_blocked() {
        let mut offer = make_offer();
        offer.mark_accepted().unwrap();
        let err = offer.mark_rejected().unwrap_err();
        assert!(matches!(err, MarketError::OfferNotPending(id) if id == offer.id));
    }

    #[test]
    fn reject_then_accept_blocked() {
        let mut offer = make_offer();
        offer.mark_rejected().unwrap();
        assert!(offer.mark_accepted().is_err(), "REJECTED → ACCEPTED must fail");
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", OfferStatus::Pending), "PENDING");
        assert_eq!(format!("{}", OfferStatus::Accepted), "ACCEPTED");
        assert_eq!(format!("{}", OfferStatus::Rejected), "REJECTED");
    }

    #[test]
    fn serde_roundtrip() {
        let offer = make_offer();
        let json = serde_json::to_string(&offer).unwrap();
        let back: Offer = serde_json::from_str(&json).unwrap();
        assert_eq!(offer, back);
    }
}
