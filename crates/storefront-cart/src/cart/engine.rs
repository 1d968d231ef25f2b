//! The cart engine: state, mutations, derived totals and events.

use std::cell::Cell;
use std::fmt;

use crate::cart::config::{CartConfig, ConfigOverrides};
use crate::cart::coupon::{normalize_code, Coupon, CouponOutcome};
use crate::cart::events::{CartEvent, CartEventKind, EventBus, EventListeners, ListenerId};
use crate::cart::line_item::{LineItem, ProductInput};
use crate::cart::pricing::CartTotals;
use crate::cart::summary::{CartSummary, OrderExport};
use crate::error::CartError;
use crate::ids::ProductId;
use crate::money::Money;
use crate::store::{Detached, ExternalChanges, StateStore, StoredCart};

/// A shopping cart bound to a state store.
///
/// Every mutation first reloads the cart if another engine wrote the store,
/// then saves it and notifies listeners: the ones registered with
/// [`on`](Self::on) in registration order, then the page-level [`EventBus`].
/// Totals, summaries and counts are computed from the latest stored state.
/// The borrowing accessors ([`items`](Self::items), [`item`](Self::item),
/// [`applied_coupon`](Self::applied_coupon), [`config`](Self::config)) show
/// the engine's copy as of its last reload.
///
/// Only [`add_item`](Self::add_item) reports failure; operations on ids that
/// are not in the cart do nothing, and store failures are logged.
///
/// ```
/// use storefront_cart::prelude::*;
///
/// let mut cart = CartEngine::new(CartConfig::default(), Detached);
/// cart.add_item(ProductInput::new("1", "X", Money::from_major(100)).with_quantity(2))
///     .unwrap();
///
/// assert_eq!(cart.total(), Money::from_major(3220));
/// assert!(cart.apply_coupon("save20").is_success());
/// assert_eq!(cart.total(), Money::from_major(3180));
/// ```
pub struct CartEngine<S: StateStore = Detached> {
    items: Vec<LineItem>,
    applied_coupon: Option<Coupon>,
    config: CartConfig,
    store: S,
    changes: S::Changes,
    stale: Cell<bool>,
    listeners: EventListeners,
    bus: EventBus,
}

impl<S: StateStore> CartEngine<S> {
    /// Create an engine and load any state already in the store.
    ///
    /// Stored state replaces `config` along with the items and coupon.
    pub fn new(config: CartConfig, store: S) -> Self {
        let changes = store.subscribe();
        let mut engine = Self {
            items: Vec::new(),
            applied_coupon: None,
            config,
            store,
            changes,
            stale: Cell::new(false),
            listeners: EventListeners::new(),
            bus: EventBus::new(),
        };
        engine.reload();
        engine
    }

    /// Publish on a bus shared with other engines instead of a private one.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    /// The page-level bus every event is published on.
    ///
    /// Clone it or [`subscribe`](EventBus::subscribe) to observe the cart
    /// without holding the engine.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // ==================== Events ====================

    /// Register a listener for one kind of event.
    pub fn on<F>(&mut self, kind: CartEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&CartEvent) + 'static,
    {
        self.listeners.on(kind, Box::new(listener))
    }

    /// Detach a listener. Returns whether it was registered for `kind`.
    pub fn off(&mut self, kind: CartEventKind, id: ListenerId) -> bool {
        self.listeners.off(kind, id)
    }

    /// Number of listeners registered for a kind.
    pub fn listener_count(&self, kind: CartEventKind) -> usize {
        self.listeners.count(kind)
    }

    fn emit(&mut self, event: CartEvent) {
        self.listeners.dispatch(&event);
        let delivered = self.bus.publish(&event);
        tracing::trace!(event = %event.kind(), delivered, "published cart event");
    }

    fn emit_updated(&mut self) {
        let summary = self.cart_summary();
        self.emit(CartEvent::CartUpdated(summary));
    }

    // ==================== Items ====================

    /// Add a product, or raise the quantity of the line already holding it.
    ///
    /// Fails with [`CartError::InvalidProduct`] when the id, name or price is
    /// missing or the price is negative; the cart is left untouched.
    pub fn add_item(&mut self, product: ProductInput) -> Result<(), CartError> {
        let quantity = product.requested_quantity();
        let fresh = product.into_line_item().inspect_err(|e| {
            tracing::warn!(error = %e, "rejected product");
        })?;
        self.refresh();

        let item = match self.items.iter_mut().find(|i| i.id == fresh.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
                existing.clone()
            }
            None => {
                self.items.push(fresh.clone());
                fresh
            }
        };
        tracing::debug!(id = %item.id, added = quantity, quantity = item.quantity, "item added");

        self.persist();
        let cart = self.cart_summary();
        self.emit(CartEvent::ItemAdded {
            item,
            quantity,
            cart,
        });
        self.emit_updated();
        Ok(())
    }

    /// Remove a product's line.
    ///
    /// An id that is not in the cart still saves the cart and emits
    /// `itemRemoved` (with no item) and `cartUpdated`.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.refresh();
        let position = self.items.iter().position(|i| &i.id == id);
        let removed = position.map(|index| self.items.remove(index));
        tracing::debug!(id = %id, removed = removed.is_some(), "item removed");

        self.persist();
        let cart = self.cart_summary();
        self.emit(CartEvent::ItemRemoved {
            item: removed,
            cart,
        });
        self.emit_updated();
    }

    /// Set a line's quantity exactly. Zero or less removes the line.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        self.refresh();
        if !self.contains(id) {
            return;
        }
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|i| &i.id == id) {
            item.quantity = quantity;
        }
        tracing::debug!(id = %id, quantity, "quantity updated");

        self.persist();
        self.emit_updated();
    }

    /// Add one to a line's quantity.
    pub fn increment_item(&mut self, id: &ProductId) {
        self.refresh();
        let Some(item) = self.items.iter_mut().find(|i| &i.id == id) else {
            return;
        };
        item.quantity = item.quantity.saturating_add(1);
        tracing::debug!(id = %id, quantity = item.quantity, "quantity incremented");

        self.persist();
        self.emit_updated();
    }

    /// Take one off a line's quantity, removing the line at 1.
    pub fn decrement_item(&mut self, id: &ProductId) {
        self.refresh();
        let Some(item) = self.items.iter_mut().find(|i| &i.id == id) else {
            return;
        };
        if item.quantity <= 1 {
            self.remove_item(id);
            return;
        }
        item.quantity -= 1;
        tracing::debug!(id = %id, quantity = item.quantity, "quantity decremented");

        self.persist();
        self.emit_updated();
    }

    /// Remove every line and the coupon.
    pub fn clear_cart(&mut self) {
        self.refresh();
        self.items.clear();
        self.applied_coupon = None;
        tracing::debug!("cart cleared");

        self.persist();
        self.emit_updated();
    }

    // ==================== Coupons ====================

    /// Apply a coupon code from the configured catalog.
    ///
    /// Codes are matched ignoring case and surrounding whitespace. An unknown
    /// code changes nothing and emits nothing. A known code replaces any
    /// coupon already applied.
    pub fn apply_coupon(&mut self, code: &str) -> CouponOutcome {
        self.refresh();
        let Some(coupon) = self.config.coupons.redeem(code) else {
            tracing::warn!(code = %normalize_code(code), "invalid coupon code");
            return CouponOutcome::rejected(code);
        };

        tracing::info!(code = %coupon.code, kind = ?coupon.kind, "coupon applied");
        self.applied_coupon = Some(coupon.clone());
        self.persist();

        let outcome = CouponOutcome::applied(coupon);
        let cart = self.cart_summary();
        self.emit(CartEvent::CouponApplied {
            outcome: outcome.clone(),
            cart,
        });
        self.emit_updated();
        outcome
    }

    /// Clear the applied coupon and return it.
    ///
    /// Saves and emits `couponRemoved` and `cartUpdated` even when no coupon
    /// was applied.
    pub fn remove_coupon(&mut self) -> Option<Coupon> {
        self.refresh();
        let removed = self.applied_coupon.take();
        tracing::debug!(code = ?removed.as_ref().map(|c| c.code.as_str()), "coupon removed");

        self.persist();
        let cart = self.cart_summary();
        self.emit(CartEvent::CouponRemoved {
            coupon: removed.clone(),
            cart,
        });
        self.emit_updated();
        removed
    }

    /// The applied coupon.
    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.applied_coupon.as_ref()
    }

    // ==================== Totals ====================

    /// All derived totals.
    pub fn totals(&self) -> CartTotals {
        self.with_state(CartTotals::calculate)
    }

    pub fn subtotal(&self) -> Money {
        self.totals().subtotal
    }

    pub fn tax(&self) -> Money {
        self.totals().tax
    }

    pub fn shipping(&self) -> Money {
        self.totals().shipping
    }

    pub fn discount(&self) -> Money {
        self.totals().discount
    }

    /// Subtotal + tax + shipping - discount.
    pub fn total(&self) -> Money {
        self.totals().total
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> u64 {
        self.with_state(|items, _, _| items.iter().map(|i| u64::from(i.quantity)).sum())
    }

    /// Number of lines.
    pub fn unique_item_count(&self) -> usize {
        self.with_state(|items, _, _| items.len())
    }

    /// Snapshot for rendering.
    pub fn cart_summary(&self) -> CartSummary {
        self.with_state(CartSummary::build)
    }

    /// Payload for the order API.
    pub fn export_for_api(&self) -> OrderExport {
        self.with_state(OrderExport::build)
    }

    // ==================== Lookup ====================

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.with_state(|items, _, _| items.iter().any(|i| &i.id == id))
    }

    pub fn is_empty(&self) -> bool {
        self.with_state(|items, _, _| items.is_empty())
    }

    pub fn has_items(&self) -> bool {
        !self.is_empty()
    }

    // ==================== Drawer ====================

    /// Emit `cartOpened`. The engine keeps no open state.
    pub fn open_cart(&mut self) {
        self.refresh();
        let summary = self.cart_summary();
        self.emit(CartEvent::CartOpened(summary));
    }

    /// Emit `cartClosed`.
    pub fn close_cart(&mut self) {
        self.refresh();
        let summary = self.cart_summary();
        self.emit(CartEvent::CartClosed(summary));
    }

    // ==================== Configuration ====================

    /// Merge overrides into the configuration.
    pub fn update_config(&mut self, overrides: ConfigOverrides) {
        self.refresh();
        self.config.merge(overrides);
        tracing::debug!(
            tax_rate = %self.config.tax_rate,
            include_tax = self.config.include_tax,
            include_shipping = self.config.include_shipping,
            "config updated"
        );

        self.persist();
        self.emit_updated();
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    // ==================== Sync ====================

    /// Pick up state written by another engine sharing the store.
    ///
    /// Returns whether the state was reloaded; a reload emits `cartUpdated`.
    pub fn sync_external_changes(&mut self) -> bool {
        if !self.refresh() {
            return false;
        }
        tracing::debug!(items = self.items.len(), "cart reloaded from store");
        self.emit_updated();
        true
    }

    /// Whether another engine wrote the store since the last reload.
    fn is_stale(&self) -> bool {
        if self.changes.pending() {
            self.stale.set(true);
        }
        self.stale.get()
    }

    /// Reload if stale. Returns whether the state was replaced.
    fn refresh(&mut self) -> bool {
        if !self.is_stale() {
            return false;
        }
        self.stale.set(false);
        self.reload()
    }

    /// Run `f` over the latest state: the stored copy while this engine is
    /// stale, its own otherwise.
    fn with_state<R>(&self, f: impl FnOnce(&[LineItem], Option<&Coupon>, &CartConfig) -> R) -> R {
        if self.is_stale() {
            match self.store.load() {
                Ok(Some(state)) => {
                    return f(&state.items, state.applied_coupon.as_ref(), &state.config)
                }
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "failed to load cart"),
            }
        }
        f(&self.items, self.applied_coupon.as_ref(), &self.config)
    }

    fn reload(&mut self) -> bool {
        match self.store.load() {
            Ok(Some(state)) => {
                self.items = state.items;
                self.applied_coupon = state.applied_coupon;
                self.config = state.config;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::error!(error = %e, "failed to load cart");
                false
            }
        }
    }

    fn persist(&self) {
        let state = StoredCart {
            items: self.items.clone(),
            applied_coupon: self.applied_coupon.clone(),
            config: self.config.clone(),
        };
        if let Err(e) = self.store.save(&state) {
            tracing::error!(error = %e, "failed to save cart");
        }
    }
}

impl<S: StateStore> fmt::Debug for CartEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartEngine")
            .field("items", &self.items)
            .field("applied_coupon", &self.applied_coupon)
            .field("config", &self.config)
            .field("listeners", &self.listeners)
            .field("stale", &self.stale.get())
            .field("bus_subscribers", &self.bus.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl Default for CartEngine<Detached> {
    fn default() -> Self {
        Self::new(CartConfig::default(), Detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn product(id: &str, price: i64) -> ProductInput {
        ProductInput::new(id, format!("Product {id}"), Money::from_major(price))
    }

    fn id(id: &str) -> ProductId {
        ProductId::new(id)
    }

    fn recorder(engine: &mut CartEngine) -> Rc<RefCell<Vec<&'static str>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in CartEventKind::ALL {
            let log = Rc::clone(&log);
            engine.on(kind, move |event| log.borrow_mut().push(event.kind().name()));
        }
        log
    }

    #[test]
    fn test_add_same_id_accumulates() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100).with_quantity(2)).unwrap();
        cart.add_item(product("1", 100)).unwrap();
        cart.add_item(product("1", 100).with_quantity(0)).unwrap();

        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.item(&id("1")).map(|i| i.quantity), Some(4));
    }

    #[test]
    fn test_add_invalid_product_changes_nothing() {
        let mut cart = CartEngine::default();
        let log = recorder(&mut cart);

        let result = cart.add_item(ProductInput {
            name: None,
            ..product("1", 100)
        });

        assert!(matches!(result, Err(CartError::InvalidProduct(_))));
        assert!(cart.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_add_emits_item_added_then_updated() {
        let mut cart = CartEngine::default();
        let log = recorder(&mut cart);

        cart.add_item(product("1", 100)).unwrap();

        assert_eq!(*log.borrow(), vec!["itemAdded", "cartUpdated"]);
    }

    #[test]
    fn test_remove_absent_id_still_emits() {
        let mut cart = CartEngine::default();
        let removed = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&removed);
        cart.on(CartEventKind::ItemRemoved, move |event| {
            if let CartEvent::ItemRemoved { item, .. } = event {
                seen.borrow_mut().push(item.clone());
            }
        });

        cart.remove_item(&id("missing"));

        assert_eq!(*removed.borrow(), vec![None]);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100)).unwrap();
        cart.add_item(product("2", 100)).unwrap();
        cart.add_item(product("3", 100)).unwrap();

        cart.update_quantity(&id("1"), 3);
        cart.update_quantity(&id("2"), 0);
        cart.update_quantity(&id("3"), -5);

        assert_eq!(cart.item(&id("1")).map(|i| i.quantity), Some(3));
        assert!(!cart.contains(&id("2")));
        assert!(!cart.contains(&id("3")));
    }

    #[test]
    fn test_unknown_ids_are_silent() {
        let mut cart = CartEngine::default();
        let log = recorder(&mut cart);

        cart.update_quantity(&id("x"), 3);
        cart.update_quantity(&id("x"), 0);
        cart.increment_item(&id("x"));
        cart.decrement_item(&id("x"));

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100).with_quantity(2)).unwrap();

        cart.increment_item(&id("1"));
        assert_eq!(cart.item_count(), 3);

        cart.decrement_item(&id("1"));
        cart.decrement_item(&id("1"));
        assert_eq!(cart.item_count(), 1);

        cart.decrement_item(&id("1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_cart_drops_coupon() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100)).unwrap();
        cart.apply_coupon("SAVE10");

        cart.clear_cart();

        assert!(cart.is_empty());
        assert!(cart.applied_coupon().is_none());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_apply_coupon_outcomes() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100).with_quantity(2)).unwrap();
        let log = recorder(&mut cart);

        let rejected = cart.apply_coupon("bogus");
        assert!(!rejected.is_success());
        assert_eq!(rejected.message, "Invalid coupon code");
        assert!(log.borrow().is_empty());

        let applied = cart.apply_coupon(" save20 ");
        assert!(applied.is_success());
        assert_eq!(applied.message, "Coupon \"SAVE20\" applied! 20% off");
        assert_eq!(cart.discount(), Money::from_major(40));
        assert_eq!(*log.borrow(), vec!["couponApplied", "cartUpdated"]);
    }

    #[test]
    fn test_new_coupon_replaces_old() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100).with_quantity(2)).unwrap();

        cart.apply_coupon("SAVE20");
        cart.apply_coupon("FREESHIP");

        assert_eq!(cart.applied_coupon().map(|c| c.code.as_str()), Some("FREESHIP"));
        assert_eq!(cart.discount(), Money::zero());
        assert_eq!(cart.shipping(), Money::zero());
    }

    #[test]
    fn test_remove_coupon_without_coupon_still_emits() {
        let mut cart = CartEngine::default();
        let log = recorder(&mut cart);

        assert!(cart.remove_coupon().is_none());
        assert_eq!(*log.borrow(), vec!["couponRemoved", "cartUpdated"]);
    }

    #[test]
    fn test_open_close_carry_summary() {
        let mut cart = CartEngine::default();
        let log = recorder(&mut cart);

        cart.open_cart();
        cart.close_cart();

        assert_eq!(*log.borrow(), vec!["cartOpened", "cartClosed"]);
    }

    #[test]
    fn test_update_config_merges_and_emits() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100).with_quantity(2)).unwrap();
        let log = recorder(&mut cart);

        cart.update_config(
            ConfigOverrides::default()
                .tax_rate(Decimal::ZERO)
                .include_shipping(false),
        );

        assert_eq!(cart.tax(), Money::zero());
        assert_eq!(cart.shipping(), Money::zero());
        assert_eq!(cart.total(), Money::from_major(200));
        assert_eq!(cart.config().currency, "₦");
        assert_eq!(*log.borrow(), vec!["cartUpdated"]);
    }

    #[test]
    fn test_off_stops_delivery() {
        let mut cart = CartEngine::default();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let listener = cart.on(CartEventKind::CartUpdated, move |_| *counter.borrow_mut() += 1);

        cart.clear_cart();
        assert!(cart.off(CartEventKind::CartUpdated, listener));
        cart.clear_cart();

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(cart.listener_count(CartEventKind::CartUpdated), 0);
    }

    #[test]
    fn test_bus_receives_after_listeners() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut cart = CartEngine::default().with_bus(bus);

        cart.add_item(product("1", 100)).unwrap();

        let channels: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|m| m.channel)
            .collect();
        assert_eq!(channels, vec!["cart:itemAdded", "cart:cartUpdated"]);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let mut cart = CartEngine::default();
        cart.add_item(product("1", 100).with_quantity(2)).unwrap();
        cart.apply_coupon("SAVE10");

        assert_eq!(cart.cart_summary(), cart.cart_summary());
        assert_eq!(cart.export_for_api(), cart.export_for_api());
    }
}
