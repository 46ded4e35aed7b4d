//! System-wide constants for the RealmTrade marketplace.

/// Maximum accounts that can be bundled into a single listing.
pub const DEFAULT_MAX_ACCOUNTS_PER_LISTING: usize = 16;

/// Maximum accounts that can be offered as payment in a single offer.
pub const DEFAULT_MAX_ACCOUNTS_PER_OFFER: usize = 16;

/// Maximum distinct item-type lines in an asking price.
pub const DEFAULT_MAX_PRICE_ITEMS: usize = 32;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "RealmTrade";
