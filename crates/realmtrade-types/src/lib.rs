//! # realmtrade-types
//!
//! Shared types, errors, and configuration for the **RealmTrade** account
//! marketplace.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`UserId`], [`ListingId`], [`OfferId`]
//! - **Item model**: [`ItemType`], [`Inventory`], [`RequiredItem`], [`Price`]
//! - **Account model**: [`Account`]
//! - **Listing model**: [`Listing`], [`ListingStatus`]
//! - **Offer model**: [`Offer`], [`OfferStatus`]
//! - **Receipt model**: [`SettlementReceipt`]
//! - **Configuration**: [`MarketplaceConfig`]
//! - **Errors**: [`MarketError`] with `RT_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod account;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod item;
pub mod listing;
pub mod offer;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use realmtrade_types::{Account, Listing, Price, MarketError, ...};

pub use account::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use item::*;
pub use listing::*;
pub use offer::*;
pub use receipt::*;

// Constants are accessed via `realmtrade_types::constants::FOO`
// (not re-exported to avoid name collisions).
