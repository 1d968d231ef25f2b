//! Cart state, coupon and checkout pricing for the storefront.
//!
//! - **Cart**: the [`CartEngine`] owns line items, the applied coupon and the
//!   pricing configuration, derives totals and notifies listeners
//! - **Store**: engines share state through a [`StateStore`]; engines on
//!   handles of one [`MemoryStore`](storefront_store::MemoryStore) price and
//!   mutate the latest stored cart; [`CartEngine::sync_external_changes`]
//!   reloads it and tells listeners
//! - **Checkout**: [`checkout::place_order`] turns the cart into an order
//!   request for the order API
//!
//! # Example
//!
//! ```rust
//! use storefront_cart::prelude::*;
//! use storefront_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let mut widget = CartEngine::new(CartConfig::default(), SharedSlot::new(store.handle()));
//! let mut checkout = CartEngine::new(CartConfig::default(), SharedSlot::new(store.handle()));
//!
//! widget.add_item(ProductInput::new("1", "X", Money::from_major(100)).with_quantity(2))?;
//! widget.apply_coupon("FREESHIP");
//!
//! assert!(checkout.sync_external_changes());
//! let summary = checkout.cart_summary();
//! assert_eq!(summary.total_formatted, "₦220.00");
//! # Ok::<(), CartError>(())
//! ```

pub mod cart;
pub mod checkout;
pub mod demo;
pub mod error;
pub mod ids;
pub mod money;
pub mod store;

pub use cart::{CartConfig, CartEngine, CartEvent, CartEventKind, CartSummary, ConfigOverrides};
pub use error::CartError;
pub use ids::{ProductId, Sku};
pub use money::Money;
pub use store::{Detached, SharedSlot, StateStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CartError;
    pub use crate::ids::{ProductId, Sku};
    pub use crate::money::Money;

    // Cart
    pub use crate::cart::{
        BusMessage, CartConfig, CartEngine, CartEvent, CartEventKind, CartSummary, CartTotals,
        ConfigOverrides, Coupon, CouponCatalog, CouponKind, CouponOutcome, CouponRule, EventBus,
        LineItem, ListenerId, OrderExport, ProductInput,
    };

    // Store
    pub use crate::store::{Detached, ExternalChanges, SharedSlot, StateStore, StoredCart};

    // Checkout
    pub use crate::checkout::{
        place_order, Customer, OrderDetails, OrderRequest, Payment, PaymentMethod,
        ShippingAddress,
    };
}
