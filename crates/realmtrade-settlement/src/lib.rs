//! # realmtrade-settlement
//!
//! **Settlement plane**: the transaction coordinator that executes the
//! atomic bidirectional custody exchange, plus post-hoc invariant audits.
//!
//! ## Architecture
//!
//! The [`SettlementCoordinator`] owns the shared marketplace state behind a
//! single lock; the write guard is the transaction boundary. A settlement:
//! 1. Re-validates every precondition against the transactional snapshot
//! 2. Resolves the payment set (explicit counter-offer, or allocator)
//! 3. Transfers custody in both directions with an undo log
//! 4. Conditionally transitions the listing `Active → Completed`
//! 5. Emits a digest-sealed [`realmtrade_types::SettlementReceipt`]
//!
//! If two callers race on one listing, exactly one transaction observes
//! `Active`; the loser fails with `ListingNotActive` and no effects.

pub mod audit;
pub mod coordinator;

pub use audit::{verify_active_disjoint, verify_listing_custody};
pub use coordinator::SettlementCoordinator;
