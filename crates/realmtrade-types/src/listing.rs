//! # Listing — a seller's offer to trade accounts for items
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  settlement   ┌───────────┐
//!   │ ACTIVE ├──────────────▶│ COMPLETED │
//!   └───┬────┘               └───────────┘
//!       │ seller cancels
//!       ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```
//!
//! Transitions are one-way and terminal. Re-completing or re-cancelling a
//! non-Active listing is an error, never a silent no-op — the losing side of
//! a settlement race must observe the failure.
//!
//! The account set is fixed at creation (deduped, order-preserving). During
//! settlement only the status and the accounts' owners change; the set
//! itself never does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ListingId, MarketError, Price, Result, UserId};

/// The lifecycle state of a listing.
///
/// Transitions are **monotonic** (never go backwards):
/// - `Active → Completed` (a settlement transaction committed)
/// - `Active → Cancelled` (the seller withdrew the listing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Open for offers and settlement.
    Active,
    /// A settlement transaction committed. **Irreversible.**
    Completed,
    /// The seller withdrew the listing. **Irreversible.**
    Cancelled,
}

impl ListingStatus {
    /// Can this status transition to the given target?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, Self::Completed | Self::Cancelled)
        )
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A trade listing: one or more accounts for sale at a fixed item price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Globally unique listing identifier.
    pub id: ListingId,
    /// The user selling the accounts.
    pub seller_id: UserId,
    /// The accounts being sold. Deduped at construction, then fixed.
    pub account_ids: Vec<AccountId>,
    /// The asking price.
    pub price: Price,
    /// Current lifecycle state.
    pub status: ListingStatus,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Construct a new Active listing. Duplicate account ids are dropped,
    /// first occurrence wins.
    #[must_use]
    pub fn new(seller_id: UserId, account_ids: Vec<AccountId>, price: Price) -> Self {
        let mut seen = std::collections::HashSet::new();
        let account_ids = account_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        Self {
            id: ListingId::new(),
            seller_id,
            account_ids,
            price,
            status: ListingStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Whether the listing is open for offers and settlement.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    /// Whether the listing's account set contains `account_id`.
    #[must_use]
    pub fn contains(&self, account_id: AccountId) -> bool {
        self.account_ids.contains(&account_id)
    }

    /// Attempt the `Active → Completed` transition.
    ///
    /// # Errors
    /// Returns [`MarketError::ListingNotActive`] if the listing is not Active.
    pub fn mark_completed(&mut self) -> Result<()> {
        if !self.status.can_transition_to(ListingStatus::Completed) {
            return Err(MarketError::ListingNotActive(self.id));
        }
        self.status = ListingStatus::Completed;
        Ok(())
    }

    /// Attempt the `Active → Cancelled` transition.
    ///
    /// # Errors
    /// Returns [`MarketError::ListingNotActive`] if the listing is not Active.
    pub fn mark_cancelled(&mut self) -> Result<()> {
        if !self.status.can_transition_to(ListingStatus::Cancelled) {
            return Err(MarketError::ListingNotActive(self.id));
        }
        self.status = ListingStatus::Cancelled;
        Ok(())
    }
}
