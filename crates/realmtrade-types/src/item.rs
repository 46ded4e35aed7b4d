//! Item multisets and asking prices.
//!
//! An [`Inventory`] is a mapping item type → quantity; a [`Price`] is an
//! ordered list of [`RequiredItem`] with unique item types. The inventory
//! feed delivers flat item sequences with repetition denoting quantity;
//! [`Inventory::from_items`] counts them into the map at ingestion instead
//! of re-parsing a delimited encoding on every read.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MarketError, Result};

/// Type alias for item-type identifiers (e.g., "Potion of Attack").
pub type ItemType = String;

/// An item multiset held by one account. Quantities are always ≥ 1; an item
/// type with quantity zero is simply absent from the map.
///
/// `BTreeMap` keeps iteration order deterministic, which matters for the
/// allocator's per-account contribution walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory(BTreeMap<ItemType, u32>);

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build an inventory from a flat item sequence, counting duplicates.
    /// This is the ingestion path for the external inventory-sync feed.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemType>,
    {
        let mut map = BTreeMap::new();
        for item in items {
            *map.entry(item.into()).or_insert(0) += 1;
        }
        Self(map)
    }

    /// Add `quantity` of an item type.
    pub fn add(&mut self, item_type: impl Into<ItemType>, quantity: u32) {
        if quantity > 0 {
            *self.0.entry(item_type.into()).or_insert(0) += quantity;
        }
    }

    /// How many of `item_type` this inventory holds (zero if absent).
    #[must_use]
    pub fn count(&self, item_type: &str) -> u32 {
        self.0.get(item_type).copied().unwrap_or(0)
    }

    /// Total number of items across all types.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.0.values().sum()
    }

    /// Whether the inventory holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate (item type, quantity) pairs in item-type order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemType, u32)> {
        self.0.iter().map(|(k, &v)| (k, v))
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = (&'a ItemType, &'a u32);
    type IntoIter = std::collections::btree_map::Iter<'a, ItemType, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One line of an asking price: an item type and how many are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredItem {
    pub item_type: ItemType,
    pub quantity: u32,
}

impl RequiredItem {
    #[must_use]
    pub fn new(item_type: impl Into<ItemType>, quantity: u32) -> Self {
        Self {
            item_type: item_type.into(),
            quantity,
        }
    }
}

impl fmt::Display for RequiredItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.quantity, self.item_type)
    }
}

/// An asking price: an ordered sequence of [`RequiredItem`] with unique item
/// types and positive quantities. Quantities for the same type must be
/// pre-merged by the caller; [`Price::new`] rejects duplicates rather than
/// merging silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price(Vec<RequiredItem>);

impl Price {
    /// Validate and construct a price.
    ///
    /// # Errors
    /// Returns [`MarketError::InvalidPrice`] on a zero quantity, an empty
    /// item-type name, or a duplicated item type.
    pub fn new(items: Vec<RequiredItem>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if item.quantity == 0 {
                return Err(MarketError::InvalidPrice {
                    reason: format!("zero quantity for item type {:?}", item.item_type),
                });
            }
            if item.item_type.is_empty() {
                return Err(MarketError::InvalidPrice {
                    reason: "empty item type".to_string(),
                });
            }
            if !seen.insert(item.item_type.as_str()) {
                return Err(MarketError::InvalidPrice {
                    reason: format!("duplicate item type {:?}", item.item_type),
                });
            }
        }
        Ok(Self(items))
    }

    /// A price requiring no items at all (the listing is given away).
    #[must_use]
    pub fn free() -> Self {
        Self(Vec::new())
    }

    /// Number of price lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no items are required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the required items in price order.
    pub fn iter(&self) -> std::slice::Iter<'_, RequiredItem> {
        self.0.iter()
    }

    /// The price as a mapping item type → quantity still owed. This is the
    /// working representation the allocator decrements.
    #[must_use]
    pub fn as_needs(&self) -> BTreeMap<ItemType, u32> {
        self.0
            .iter()
            .map(|item| (item.item_type.clone(), item.quantity))
            .collect()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "free");
        }
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
