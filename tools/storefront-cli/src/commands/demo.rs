//! Seed the demo cart and show it the way the cart widget sees it.

use anyhow::Result;
use storefront_cart::{demo, CartEngine, SharedSlot};
use storefront_store::MemoryStore;

use super::DemoArgs;
use crate::context::Context;

/// Run the demo command.
///
/// The checkout page seeds the cart. The widget shares the same store and
/// follows the checkout page's events on the page bus before printing.
pub fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let store = MemoryStore::new();
    let mut checkout = CartEngine::new(ctx.config.cart.clone(), SharedSlot::new(store.handle()));
    let mut page_events = checkout.bus().subscribe();
    let mut widget = CartEngine::new(ctx.config.cart.clone(), SharedSlot::new(store.handle()))
        .with_bus(checkout.bus().clone());

    if demo::seed_if_empty(&mut checkout) {
        ctx.output
            .debug(&format!("Seeded {} demo products", checkout.unique_item_count()));
    }

    if let Some(code) = args.coupon {
        let outcome = checkout.apply_coupon(&code);
        if outcome.is_success() {
            ctx.output.success(&outcome.message);
        } else {
            ctx.output.warn(&format!("{}: {}", outcome.message, outcome.code));
        }
    }

    for message in std::iter::from_fn(|| page_events.try_recv().ok()) {
        ctx.output.debug(&format!(
            "{} ({} items)",
            message.channel,
            message.event.cart().item_count
        ));
    }

    if widget.sync_external_changes() {
        ctx.output.debug("Cart widget synced from checkout page");
    }
    ctx.output.summary(&widget.cart_summary());

    Ok(())
}
