//! Demo products for an empty checkout page.

use crate::cart::{CartEngine, ProductInput};
use crate::money::Money;
use crate::store::StateStore;

/// The products seeded by [`seed_if_empty`].
pub fn demo_products() -> Vec<ProductInput> {
    vec![
        ProductInput::new("1", "Queen Fashion Long Sleeve Shirt", Money::from_major(20000))
            .with_category("Face")
            .with_image("assets/images/products/1.webp"),
        ProductInput::new("2", "Face Oil Premium", Money::from_major(24990))
            .with_quantity(2)
            .with_category("Face")
            .with_image("assets/images/products/2.webp"),
        ProductInput::new("3", "Body Cream Luxury", Money::from_major(18990))
            .with_category("Body")
            .with_image("assets/images/products/3.webp"),
    ]
}

/// Fill an empty cart with the demo products.
///
/// Returns whether anything was added. A cart that already has items is
/// left alone.
pub fn seed_if_empty<S: StateStore>(engine: &mut CartEngine<S>) -> bool {
    if engine.has_items() {
        return false;
    }
    for product in demo_products() {
        if let Err(e) = engine.add_item(product) {
            tracing::warn!(error = %e, "demo product rejected");
        }
    }
    tracing::debug!(items = engine.unique_item_count(), "seeded demo cart");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    #[test]
    fn test_seed_empty_cart() {
        let mut cart = CartEngine::default();

        assert!(seed_if_empty(&mut cart));
        assert_eq!(cart.unique_item_count(), 3);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), Money::from_major(88970));
        assert_eq!(cart.total(), Money::from_major(103867));
    }

    #[test]
    fn test_seed_leaves_existing_cart() {
        let mut cart = CartEngine::default();
        cart.add_item(ProductInput::new("9", "Lip Balm", Money::from_major(500)))
            .unwrap();

        assert!(!seed_if_empty(&mut cart));
        assert_eq!(cart.unique_item_count(), 1);
        assert!(cart.contains(&ProductId::new("9")));
    }
}
