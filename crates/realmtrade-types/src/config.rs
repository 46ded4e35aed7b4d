//! Configuration for marketplace validation limits.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Tunable limits enforced when listings and offers are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Maximum accounts bundled into one listing.
    pub max_accounts_per_listing: usize,
    /// Maximum accounts offered as payment in one offer.
    pub max_accounts_per_offer: usize,
    /// Maximum distinct item-type lines in an asking price.
    pub max_price_items: usize,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            max_accounts_per_listing: constants::DEFAULT_MAX_ACCOUNTS_PER_LISTING,
            max_accounts_per_offer: constants::DEFAULT_MAX_ACCOUNTS_PER_OFFER,
            max_price_items: constants::DEFAULT_MAX_PRICE_ITEMS,
        }
    }
}
