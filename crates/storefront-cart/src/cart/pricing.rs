//! Cart pricing calculations.

use crate::cart::config::CartConfig;
use crate::cart::coupon::Coupon;
use crate::cart::line_item::LineItem;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Derived totals for a cart.
///
/// Computed from the line items, the applied coupon and the configuration;
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of unit price times quantity.
    pub subtotal: Money,
    /// Tax on the subtotal, or zero when tax is off.
    pub tax: Money,
    /// Per-unit shipping, or zero when shipping is off or waived.
    pub shipping: Money,
    /// Percentage coupon discount on the subtotal.
    pub discount: Money,
    /// Subtotal + tax + shipping - discount. Not clamped at zero.
    pub total: Money,
    /// Sum of quantities.
    pub item_count: u64,
    /// Number of distinct line items.
    pub unique_item_count: usize,
}

impl CartTotals {
    /// Calculate totals for the given cart state.
    ///
    /// ```
    /// use storefront_cart::prelude::*;
    ///
    /// let config = CartConfig::default();
    /// let items = [LineItem {
    ///     id: ProductId::new("1"),
    ///     name: "X".to_string(),
    ///     price: Money::from_major(100),
    ///     quantity: 2,
    ///     image: None,
    ///     category: None,
    ///     sku: None,
    /// }];
    ///
    /// let totals = CartTotals::calculate(&items, None, &config);
    /// assert_eq!(totals.total, Money::from_major(3220));
    /// ```
    pub fn calculate(items: &[LineItem], coupon: Option<&Coupon>, config: &CartConfig) -> Self {
        let subtotal: Money = items.iter().map(LineItem::line_total).sum();
        let item_count: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();

        let tax = if config.include_tax {
            subtotal.scale(config.tax_rate)
        } else {
            Money::zero()
        };

        let free_shipping = coupon.is_some_and(Coupon::is_free_shipping);
        let shipping = if config.include_shipping && !free_shipping {
            items
                .iter()
                .map(|i| config.shipping_fee_per_item * i.quantity)
                .sum()
        } else {
            Money::zero()
        };

        let discount = coupon.map_or(Money::zero(), |c| c.discount_on(subtotal));

        Self {
            subtotal,
            tax,
            shipping,
            discount,
            total: subtotal + tax + shipping - discount,
            item_count,
            unique_item_count: items.len(),
        }
    }

    /// Check if a discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Check if the discount exceeds everything else.
    pub fn is_negative(&self) -> bool {
        self.total.is_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::config::ConfigOverrides;
    use crate::ids::ProductId;
    use rust_decimal::Decimal;

    fn item(id: &str, price: i64, quantity: u32) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::from_major(price),
            quantity,
            image: None,
            category: None,
            sku: None,
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = CartTotals::calculate(&[], None, &CartConfig::default());
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.total, Money::zero());
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_totals_with_default_config() {
        let items = [item("1", 20000, 1), item("2", 24990, 2), item("3", 18990, 1)];
        let totals = CartTotals::calculate(&items, None, &CartConfig::default());

        assert_eq!(totals.subtotal, Money::from_major(88970));
        assert_eq!(totals.tax, Money::from_major(8897));
        assert_eq!(totals.shipping, Money::from_major(6000));
        assert_eq!(totals.total, Money::from_major(103867));
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.unique_item_count, 3);
    }

    #[test]
    fn test_tax_and_shipping_switches() {
        let config = CartConfig::default().with_overrides(
            ConfigOverrides::default()
                .include_tax(false)
                .include_shipping(false),
        );
        let totals = CartTotals::calculate(&[item("1", 100, 2)], None, &config);

        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.total, Money::from_major(200));
    }

    #[test]
    fn test_free_shipping_only_zeroes_shipping() {
        let coupon = Coupon::free_shipping("FREESHIP");
        let totals =
            CartTotals::calculate(&[item("1", 100, 2)], Some(&coupon), &CartConfig::default());

        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.discount, Money::zero());
        assert!(!totals.has_discount());
        assert_eq!(totals.total, Money::from_major(220));
    }

    #[test]
    fn test_total_can_go_negative() {
        let config = CartConfig::default().with_overrides(
            ConfigOverrides::default()
                .include_tax(false)
                .include_shipping(false),
        );
        // A catalog is only validated on demand, so oversized coupons still price.
        let coupon = Coupon::percentage("HUGE", Decimal::from(150));
        let totals = CartTotals::calculate(&[item("1", 100, 1)], Some(&coupon), &config);

        assert_eq!(totals.discount, Money::from_major(150));
        assert_eq!(totals.total, Money::from_major(-50));
        assert!(totals.is_negative());
    }
}
