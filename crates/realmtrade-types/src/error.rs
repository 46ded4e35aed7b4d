//! Error types for the RealmTrade settlement engine.
//!
//! All errors use the `RT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Listing errors
//! - 2xx: Account / registry errors
//! - 3xx: Payment allocation errors
//! - 4xx: Offer errors
//! - 8xx: Invariant violations
//! - 9xx: General / internal errors
//!
//! Every variant is recoverable and caller-facing; nothing here is fatal to
//! the engine. Storage failures mid-settlement surface as
//! [`MarketError::SettlementFailed`] with the cause attached.

use thiserror::Error;

use crate::{AccountId, ItemType, ListingId, OfferId};

/// Central error enum for all RealmTrade operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarketError {
    // =================================================================
    // Listing Errors (1xx)
    // =================================================================
    /// The requested listing does not exist.
    #[error("RT_ERR_100: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// The listing exists but is no longer Active (completed or cancelled).
    #[error("RT_ERR_101: Listing is not active: {0}")]
    ListingNotActive(ListingId),

    /// A seller tried to accept their own listing.
    #[error("RT_ERR_102: Cannot accept your own listing")]
    CannotAcceptOwnListing,

    /// A seller tried to place an offer on their own listing.
    #[error("RT_ERR_103: Cannot offer on your own listing")]
    CannotOfferOnOwnListing,

    /// The caller is not the seller of the listing.
    #[error("RT_ERR_104: Caller is not the seller of listing {0}")]
    NotListingSeller(ListingId),

    /// The account set for a listing or offer failed validation.
    #[error("RT_ERR_105: Invalid account set: {reason}")]
    InvalidAccountSet { reason: String },

    /// One or more accounts are already committed to an Active listing or
    /// a Pending offer.
    #[error("RT_ERR_106: Accounts already committed elsewhere: {account_ids:?}")]
    ListingConflict { account_ids: Vec<AccountId> },

    /// The asking price failed validation (duplicate or zero-quantity lines).
    #[error("RT_ERR_107: Invalid price: {reason}")]
    InvalidPrice { reason: String },

    // =================================================================
    // Account / Registry Errors (2xx)
    // =================================================================
    /// The requested account does not exist in the directory.
    #[error("RT_ERR_200: Account not found: {0}")]
    AccountNotFound(AccountId),

    /// The caller does not own one or more of the named accounts.
    #[error("RT_ERR_201: Accounts not owned by caller: {account_ids:?}")]
    AccountsNotOwned { account_ids: Vec<AccountId> },

    // =================================================================
    // Payment Allocation Errors (3xx)
    // =================================================================
    /// The buyer's aggregate holdings cannot cover the price. Carries the
    /// first short item in price order.
    #[error("RT_ERR_300: Insufficient {item_type}: have {held}, need {required}")]
    InsufficientItems {
        item_type: ItemType,
        held: u32,
        required: u32,
    },

    /// The greedy allocation pass exhausted all accounts without covering
    /// the price even though the aggregate check passed. Signals an
    /// inconsistency and should be treated as a defect, not a user error.
    #[error("RT_ERR_301: Allocation infeasible over the supplied accounts")]
    AllocationInfeasible,

    // =================================================================
    // Offer Errors (4xx)
    // =================================================================
    /// The requested offer does not exist.
    #[error("RT_ERR_400: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The offer exists but is no longer Pending.
    #[error("RT_ERR_401: Offer is not pending: {0}")]
    OfferNotPending(OfferId),

    // =================================================================
    // Invariant Violations (8xx)
    // =================================================================
    /// A custody invariant failed an audit — critical safety alert.
    #[error("RT_ERR_800: Ownership invariant violation: {reason}")]
    OwnershipInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Settlement aborted at the transaction boundary; no partial effects.
    #[error("RT_ERR_900: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// Unrecoverable internal error.
    #[error("RT_ERR_901: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;
