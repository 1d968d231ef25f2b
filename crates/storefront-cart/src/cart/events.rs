//! Cart events, engine-owned listeners and the page-level event bus.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::cart::coupon::{Coupon, CouponOutcome};
use crate::cart::line_item::LineItem;
use crate::cart::summary::CartSummary;

/// Bus messages kept per subscriber before the oldest are dropped.
const BUS_CAPACITY: usize = 64;

/// The fixed set of cart events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CartEventKind {
    CartUpdated,
    CartOpened,
    CartClosed,
    ItemAdded,
    ItemRemoved,
    CouponApplied,
    CouponRemoved,
}

impl CartEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [CartEventKind; 7] = [
        CartEventKind::CartUpdated,
        CartEventKind::CartOpened,
        CartEventKind::CartClosed,
        CartEventKind::ItemAdded,
        CartEventKind::ItemRemoved,
        CartEventKind::CouponApplied,
        CartEventKind::CouponRemoved,
    ];

    /// Event name as seen by listeners (e.g. "cartUpdated").
    pub fn name(&self) -> &'static str {
        match self {
            CartEventKind::CartUpdated => "cartUpdated",
            CartEventKind::CartOpened => "cartOpened",
            CartEventKind::CartClosed => "cartClosed",
            CartEventKind::ItemAdded => "itemAdded",
            CartEventKind::ItemRemoved => "itemRemoved",
            CartEventKind::CouponApplied => "couponApplied",
            CartEventKind::CouponRemoved => "couponRemoved",
        }
    }

    /// Bus channel name (e.g. "cart:cartUpdated").
    pub fn channel(&self) -> String {
        format!("cart:{}", self.name())
    }
}

impl fmt::Display for CartEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event with its payload. Every payload carries the cart summary taken
/// right after the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CartEvent {
    CartUpdated(CartSummary),
    CartOpened(CartSummary),
    CartClosed(CartSummary),
    ItemAdded {
        /// The line item after the add.
        item: LineItem,
        /// Quantity that was added.
        quantity: u32,
        cart: CartSummary,
    },
    ItemRemoved {
        /// The removed line item, if the id was in the cart.
        item: Option<LineItem>,
        cart: CartSummary,
    },
    CouponApplied {
        outcome: CouponOutcome,
        cart: CartSummary,
    },
    CouponRemoved {
        /// The coupon that was active, if any.
        coupon: Option<Coupon>,
        cart: CartSummary,
    },
}

impl CartEvent {
    /// Which kind of event this is.
    pub fn kind(&self) -> CartEventKind {
        match self {
            CartEvent::CartUpdated(_) => CartEventKind::CartUpdated,
            CartEvent::CartOpened(_) => CartEventKind::CartOpened,
            CartEvent::CartClosed(_) => CartEventKind::CartClosed,
            CartEvent::ItemAdded { .. } => CartEventKind::ItemAdded,
            CartEvent::ItemRemoved { .. } => CartEventKind::ItemRemoved,
            CartEvent::CouponApplied { .. } => CartEventKind::CouponApplied,
            CartEvent::CouponRemoved { .. } => CartEventKind::CouponRemoved,
        }
    }

    /// The cart summary carried by the event.
    pub fn cart(&self) -> &CartSummary {
        match self {
            CartEvent::CartUpdated(cart)
            | CartEvent::CartOpened(cart)
            | CartEvent::CartClosed(cart)
            | CartEvent::ItemAdded { cart, .. }
            | CartEvent::ItemRemoved { cart, .. }
            | CartEvent::CouponApplied { cart, .. }
            | CartEvent::CouponRemoved { cart, .. } => cart,
        }
    }
}

/// Handle returned by [`CartEngine::on`](crate::CartEngine::on), used to
/// detach the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A listener callback.
pub type Listener = Box<dyn FnMut(&CartEvent)>;

/// Listeners registered on one engine, kept in registration order.
#[derive(Default)]
pub struct EventListeners {
    next_id: u64,
    entries: Vec<(CartEventKind, ListenerId, Listener)>,
}

impl EventListeners {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind.
    pub fn on(&mut self, kind: CartEventKind, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((kind, id, listener));
        id
    }

    /// Detach a listener. Returns whether it was registered for `kind`.
    pub fn off(&mut self, kind: CartEventKind, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|(entry_kind, entry_id, _)| !(*entry_kind == kind && *entry_id == id));
        self.entries.len() != before
    }

    /// Call every listener for the event's kind, in registration order.
    pub fn dispatch(&mut self, event: &CartEvent) {
        let kind = event.kind();
        for (_, _, listener) in self
            .entries
            .iter_mut()
            .filter(|(entry_kind, _, _)| *entry_kind == kind)
        {
            listener(event);
        }
    }

    /// Number of listeners for a kind.
    pub fn count(&self, kind: CartEventKind) -> usize {
        self.entries.iter().filter(|(k, _, _)| *k == kind).count()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("next_id", &self.next_id)
            .field("listeners", &self.entries.len())
            .finish()
    }
}

/// A cart event as delivered on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    /// Channel name, `cart:<eventName>`.
    pub channel: String,
    pub event: CartEvent,
}

/// Page-level event bus.
///
/// Clones share one channel, so code without a reference to the engine can
/// subscribe to cart events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusMessage>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// Publish an event on its `cart:` channel.
    ///
    /// Returns how many subscribers received it.
    pub fn publish(&self, event: &CartEvent) -> usize {
        let message = BusMessage {
            channel: event.kind().channel(),
            event: event.clone(),
        };
        self.tx.send(message).unwrap_or_default()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
