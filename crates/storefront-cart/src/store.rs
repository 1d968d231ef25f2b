//! Where cart state is persisted between engines.
//!
//! An engine loads its state on construction, saves after every mutation
//! and polls its [`ExternalChanges`] feed to learn that another engine wrote
//! the same state.

use std::cell::RefCell;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_store::{store_key, ChangeFeed, MemoryStore};

use crate::cart::{CartConfig, Coupon, CouponCatalog, CouponKind, CouponRule, LineItem, SpecialCoupon};
use crate::error::CartError;
use crate::ids::{ProductId, Sku};
use crate::money::Money;

/// The persisted part of a cart. Totals are derived and never stored.
///
/// In a slot, amounts are written as decimal strings so reloading never
/// rounds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SlotCart", into = "SlotCart")]
pub struct StoredCart {
    pub items: Vec<LineItem>,
    pub applied_coupon: Option<Coupon>,
    pub config: CartConfig,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotCart {
    items: Vec<SlotLine>,
    #[serde(default)]
    applied_coupon: Option<SlotCoupon>,
    #[serde(default)]
    config: Option<SlotConfig>,
}

#[derive(Serialize, Deserialize)]
struct SlotLine {
    id: ProductId,
    name: String,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    quantity: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    sku: Option<Sku>,
}

#[derive(Serialize, Deserialize)]
struct SlotCoupon {
    code: String,
    #[serde(rename = "type")]
    kind: CouponKind,
    #[serde(with = "rust_decimal::serde::str")]
    value: Decimal,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotConfig {
    #[serde(with = "rust_decimal::serde::str")]
    tax_rate: Decimal,
    include_tax: bool,
    #[serde(with = "rust_decimal::serde::str")]
    shipping_fee_per_item: Decimal,
    include_shipping: bool,
    currency: String,
    coupons: BTreeMap<String, SlotRule>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SlotRule {
    Percentage(#[serde(with = "rust_decimal::serde::str")] Decimal),
    Special(SpecialCoupon),
}

impl From<StoredCart> for SlotCart {
    fn from(cart: StoredCart) -> Self {
        let config = cart.config;
        Self {
            items: cart
                .items
                .into_iter()
                .map(|item| SlotLine {
                    id: item.id,
                    name: item.name,
                    price: item.price.amount(),
                    quantity: item.quantity,
                    image: item.image,
                    category: item.category,
                    sku: item.sku,
                })
                .collect(),
            applied_coupon: cart.applied_coupon.map(|coupon| SlotCoupon {
                code: coupon.code,
                kind: coupon.kind,
                value: coupon.value,
            }),
            config: Some(SlotConfig {
                tax_rate: config.tax_rate,
                include_tax: config.include_tax,
                shipping_fee_per_item: config.shipping_fee_per_item.amount(),
                include_shipping: config.include_shipping,
                coupons: config
                    .coupons
                    .iter()
                    .map(|(code, rule)| {
                        let rule = match rule {
                            CouponRule::Percentage(percent) => SlotRule::Percentage(*percent),
                            CouponRule::Special(special) => SlotRule::Special(*special),
                        };
                        (code.to_string(), rule)
                    })
                    .collect(),
                currency: config.currency,
            }),
        }
    }
}

impl From<SlotCart> for StoredCart {
    fn from(slot: SlotCart) -> Self {
        let config = match slot.config {
            Some(config) => {
                let mut coupons = CouponCatalog::new();
                for (code, rule) in config.coupons {
                    let rule = match rule {
                        SlotRule::Percentage(percent) => CouponRule::Percentage(percent),
                        SlotRule::Special(special) => CouponRule::Special(special),
                    };
                    coupons.insert(&code, rule);
                }
                CartConfig {
                    tax_rate: config.tax_rate,
                    include_tax: config.include_tax,
                    shipping_fee_per_item: Money::new(config.shipping_fee_per_item),
                    include_shipping: config.include_shipping,
                    currency: config.currency,
                    coupons,
                }
            }
            None => CartConfig::default(),
        };

        Self {
            items: slot
                .items
                .into_iter()
                .map(|line| LineItem {
                    id: line.id,
                    name: line.name,
                    price: Money::new(line.price),
                    quantity: line.quantity,
                    image: line.image,
                    category: line.category,
                    sku: line.sku,
                })
                .collect(),
            applied_coupon: slot.applied_coupon.map(|coupon| Coupon {
                code: coupon.code,
                kind: coupon.kind,
                value: coupon.value,
            }),
            config,
        }
    }
}

/// Port for loading and saving cart state.
pub trait StateStore {
    /// Feed of writes made by other engines.
    type Changes: ExternalChanges;

    /// Read the stored state, if any was saved.
    fn load(&self) -> Result<Option<StoredCart>, CartError>;

    /// Replace the stored state.
    fn save(&self, state: &StoredCart) -> Result<(), CartError>;

    /// Start listening for writes made elsewhere.
    fn subscribe(&self) -> Self::Changes;
}

/// Polled notification of writes made by other engines.
pub trait ExternalChanges {
    /// Consume pending notifications; true if any concerned the cart.
    fn pending(&self) -> bool;
}

/// Cart state in a slot of a [`MemoryStore`].
///
/// Engines built on handles of the same store share the slot. An engine is
/// never notified of its own writes.
#[derive(Debug)]
pub struct SharedSlot {
    store: MemoryStore,
    key: String,
}

impl SharedSlot {
    /// Use the default `cart:state` slot.
    pub fn new(store: MemoryStore) -> Self {
        Self::with_key(store, store_key!("cart", "state"))
    }

    /// Use a custom slot key.
    pub fn with_key(store: MemoryStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Slot key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store handle.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl StateStore for SharedSlot {
    type Changes = SlotChanges;

    fn load(&self) -> Result<Option<StoredCart>, CartError> {
        Ok(self.store.get(&self.key)?)
    }

    fn save(&self, state: &StoredCart) -> Result<(), CartError> {
        Ok(self.store.set(&self.key, state)?)
    }

    fn subscribe(&self) -> SlotChanges {
        SlotChanges {
            feed: RefCell::new(self.store.watch()),
            key: self.key.clone(),
        }
    }
}

/// Change feed filtered to one slot.
#[derive(Debug)]
pub struct SlotChanges {
    feed: RefCell<ChangeFeed>,
    key: String,
}

impl ExternalChanges for SlotChanges {
    fn pending(&self) -> bool {
        let changes = self.feed.borrow_mut().drain();
        changes.iter().any(|change| change.key == self.key)
    }
}

/// No persistence. The engine's state lives and dies with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl StateStore for Detached {
    type Changes = NoChanges;

    fn load(&self) -> Result<Option<StoredCart>, CartError> {
        Ok(None)
    }

    fn save(&self, _state: &StoredCart) -> Result<(), CartError> {
        Ok(())
    }

    fn subscribe(&self) -> NoChanges {
        NoChanges
    }
}

/// Feed that never reports anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChanges;

impl ExternalChanges for NoChanges {
    fn pending(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;
    use crate::money::Money;

    fn state() -> StoredCart {
        StoredCart {
            items: vec![LineItem {
                id: ProductId::new("1"),
                name: "X".to_string(),
                price: Money::from_major(100),
                quantity: 2,
                image: None,
                category: None,
                sku: None,
            }],
            applied_coupon: Some(Coupon::free_shipping("FREESHIP")),
            config: CartConfig::default(),
        }
    }

    #[test]
    fn test_slot_key() {
        assert_eq!(SharedSlot::new(MemoryStore::new()).key(), "cart:state");
    }

    #[test]
    fn test_shared_slot_round_trip_between_handles() {
        let store = MemoryStore::new();
        let page = SharedSlot::new(store.handle());
        let tab = SharedSlot::new(store.handle());
        let changes = tab.subscribe();

        assert!(tab.load().unwrap().is_none());
        page.save(&state()).unwrap();

        assert!(changes.pending());
        assert!(!changes.pending());
        assert_eq!(tab.load().unwrap(), Some(state()));
    }

    #[test]
    fn test_own_writes_and_other_keys_are_not_pending() {
        let store = MemoryStore::new();
        let page = SharedSlot::new(store.handle());
        let changes = page.subscribe();

        page.save(&state()).unwrap();
        store.set("wishlist:state", &1).unwrap();

        assert!(!changes.pending());
    }

    #[test]
    fn test_corrupt_slot_is_a_store_error() {
        let store = MemoryStore::new();
        store.set("cart:state", &"garbage").unwrap();

        let result = SharedSlot::new(store.handle()).load();
        assert!(matches!(result, Err(CartError::Store(_))));
    }

    #[test]
    fn test_stored_cart_defaults_missing_fields() {
        let stored: StoredCart = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(stored.applied_coupon.is_none());
        assert_eq!(stored.config, CartConfig::default());
    }

    #[test]
    fn test_slot_amounts_are_exact_strings() {
        let mut cart = state();
        cart.items[0].price = Money::new("19.999999999999999999".parse().unwrap());

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"][0]["price"], "19.999999999999999999");
        assert_eq!(json["config"]["taxRate"], "0.10");
        assert_eq!(json["config"]["coupons"]["SAVE20"], "20");
        assert_eq!(json["config"]["coupons"]["FREESHIP"]["type"], "free_shipping");

        let back: StoredCart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_detached_keeps_nothing() {
        let store = Detached;
        store.save(&state()).unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.subscribe().pending());
    }
}
