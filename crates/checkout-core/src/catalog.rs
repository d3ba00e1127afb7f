//! # Catalog
//!
//! The items a store sells, keyed by a short business identifier.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Standard Catalog                                  │
//! │                                                                         │
//! │   key        name          price                                        │
//! │   ─────────  ────────────  ──────                                       │
//! │   VOUCHER    Voucher         5.00                                       │
//! │   MUG        Coffee Mug      7.50                                       │
//! │   TSHIRT     T-Shirt        20.00                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A catalog is built once and never mutated afterwards, so it can be
//! shared between threads without locking. Items are handed out as
//! `Arc<Item>`: a ticket line references the catalog entry instead of
//! copying it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{normalize_item_key, validate_item_key, validate_item_name};

/// Key of the standard voucher item.
pub const VOUCHER: &str = "VOUCHER";
/// Key of the standard coffee mug item.
pub const MUG: &str = "MUG";
/// Key of the standard t-shirt item.
pub const TSHIRT: &str = "TSHIRT";

// =============================================================================
// Item
// =============================================================================

/// A catalog entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    key: String,
    name: String,
    price: Money,
}

impl Item {
    fn new(key: String, name: String, price: Money) -> Self {
        Item { key, name, price }
    }

    /// Business identifier, unique within the catalog (`"VOUCHER"`).
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name printed on the receipt.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Read-only mapping from item key to item.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: HashMap<String, Arc<Item>>,
    /// Keys in insertion order, for listings.
    order: Vec<String>,
}

impl Catalog {
    /// The store's built-in catalog.
    pub fn standard() -> Self {
        let mut catalog = Catalog::default();
        for (key, name, cents) in [
            (VOUCHER, "Voucher", 500),
            (MUG, "Coffee Mug", 750),
            (TSHIRT, "T-Shirt", 2000),
        ] {
            catalog.insert(Item::new(
                key.to_string(),
                name.to_string(),
                Money::from_cents(cents),
            ));
        }
        catalog
    }

    /// Starts building a custom catalog.
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::catalog::Catalog;
    /// use checkout_core::money::Money;
    ///
    /// let catalog = Catalog::builder()
    ///     .item("PEN", "Ballpoint Pen", Money::from_cents(120))
    ///     .item("PAD", "Note Pad", Money::from_cents(300))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(catalog.lookup("pen").unwrap().name(), "Ballpoint Pen");
    /// ```
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Finds an item by key.
    ///
    /// The key is normalized first (trimmed, uppercased). A missing key is
    /// reported as [`CoreError::ItemNotFound`], which callers treat as
    /// recoverable.
    pub fn lookup(&self, key: &str) -> CoreResult<Arc<Item>> {
        let normalized = normalize_item_key(key);
        match self.items.get(&normalized) {
            Some(item) => Ok(Arc::clone(item)),
            None => {
                debug!(key = %key, "Item not in catalog");
                Err(CoreError::ItemNotFound(key.trim().to_string()))
            }
        }
    }

    /// Keys in the order the items were registered.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Items in the order they were registered.
    pub fn items(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.order.iter().filter_map(|key| self.items.get(key))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the catalog has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn insert(&mut self, item: Item) {
        self.order.push(item.key.clone());
        self.items.insert(item.key.clone(), Arc::new(item));
    }
}

// =============================================================================
// Catalog Builder
// =============================================================================

/// Collects items and validates them all in [`CatalogBuilder::build`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    pending: Vec<(String, String, Money)>,
}

impl CatalogBuilder {
    /// Queues an item. Validation happens in `build`.
    pub fn item(mut self, key: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        self.pending.push((key.into(), name.into(), price));
        self
    }

    /// Validates every queued item and produces the catalog.
    ///
    /// ## Errors
    /// - Invalid key or name: [`ValidationError`] wrapped in `CoreError`
    /// - Two items whose normalized keys collide: `ValidationError::Duplicate`
    pub fn build(self) -> CoreResult<Catalog> {
        let mut catalog = Catalog::default();

        for (key, name, price) in self.pending {
            validate_item_key(&key)?;
            validate_item_name(&name)?;

            let key = normalize_item_key(&key);
            if catalog.items.contains_key(&key) {
                return Err(ValidationError::Duplicate {
                    field: "key".to_string(),
                    value: key,
                }
                .into());
            }

            catalog.insert(Item::new(key, name.trim().to_string(), price));
        }

        debug!(items = catalog.len(), "Catalog built");
        Ok(catalog)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
