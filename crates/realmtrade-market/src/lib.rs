//! # realmtrade-market
//!
//! **Marketplace core** for RealmTrade: the listing/offer book, the conflict
//! guard, the payment fulfillment allocator, and the [`Marketplace`]
//! aggregate that owns creation-time validation.
//!
//! Everything in this crate is side-effect-free with respect to custody:
//! listings and offers are recorded and transitioned here, but account
//! ownership only ever changes in the settlement crate's coordinator.

pub mod allocator;
pub mod book;
pub mod conflict;
pub mod marketplace;

pub use allocator::{Shortfall, aggregate_shortfall, allocate};
pub use book::ListingBook;
pub use conflict::ConflictGuard;
pub use marketplace::Marketplace;
