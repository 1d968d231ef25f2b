//! Shopping cart module.
//!
//! Contains the cart engine, line items, coupons, pricing and the events the
//! engine emits.

mod config;
mod coupon;
mod engine;
mod events;
mod line_item;
mod pricing;
mod summary;

pub use config::{CartConfig, ConfigOverrides};
pub use coupon::{
    normalize_code, Coupon, CouponCatalog, CouponKind, CouponOutcome, CouponRule, SpecialCoupon,
    INVALID_COUPON_MESSAGE,
};
pub use engine::CartEngine;
pub use events::{BusMessage, CartEvent, CartEventKind, EventBus, EventListeners, Listener, ListenerId};
pub use line_item::{LineItem, ProductInput};
pub use pricing::CartTotals;
pub use summary::{CartSummary, ExportLine, ExportTotals, OrderExport, SummaryLine};
