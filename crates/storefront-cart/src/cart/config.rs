//! Cart configuration.

use crate::cart::coupon::CouponCatalog;
use crate::error::CartError;
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing and display settings for a cart.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Tax as a fraction of the subtotal (default 0.10).
    #[serde(alias = "taxRate")]
    pub tax_rate: Decimal,

    /// Whether tax is charged (default true).
    #[serde(alias = "includeTax")]
    pub include_tax: bool,

    /// Shipping charged per unit in the cart (default 1500).
    #[serde(alias = "shippingFeePerItem")]
    pub shipping_fee_per_item: Money,

    /// Whether shipping is charged (default true).
    #[serde(alias = "includeShipping")]
    pub include_shipping: bool,

    /// Currency symbol prefixed to formatted amounts (default "₦").
    pub currency: String,

    /// Redeemable coupon codes.
    pub coupons: CouponCatalog,
}

fn default_tax_rate() -> Decimal {
    Decimal::new(10, 2)
}

fn default_shipping_fee() -> Money {
    Money::from_major(1500)
}

fn default_currency() -> String {
    "₦".to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            include_tax: true,
            shipping_fee_per_item: default_shipping_fee(),
            include_shipping: true,
            currency: default_currency(),
            coupons: CouponCatalog::default(),
        }
    }
}

impl CartConfig {
    /// Apply overrides, replacing each field that is present.
    ///
    /// The merge is shallow: an overriding coupon catalog replaces the whole
    /// catalog rather than adding codes to it.
    pub fn merge(&mut self, overrides: ConfigOverrides) {
        if let Some(rate) = overrides.tax_rate {
            self.tax_rate = rate;
        }
        if let Some(include) = overrides.include_tax {
            self.include_tax = include;
        }
        if let Some(fee) = overrides.shipping_fee_per_item {
            self.shipping_fee_per_item = fee;
        }
        if let Some(include) = overrides.include_shipping {
            self.include_shipping = include;
        }
        if let Some(currency) = overrides.currency {
            self.currency = currency;
        }
        if let Some(coupons) = overrides.coupons {
            self.coupons = coupons;
        }
    }

    /// Builder-style [`merge`](Self::merge).
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.merge(overrides);
        self
    }

    /// Check that rates and fees are in range.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(CartError::InvalidConfig(format!(
                "tax_rate {} outside 0-1",
                self.tax_rate
            )));
        }
        if self.shipping_fee_per_item.is_negative() {
            return Err(CartError::InvalidConfig(format!(
                "shipping_fee_per_item {} is negative",
                self.shipping_fee_per_item
            )));
        }
        self.coupons.validate()
    }

    /// Tax rate as a whole percentage label (e.g. "10%").
    pub fn tax_percentage(&self) -> String {
        let percent = self
            .tax_rate
            .saturating_mul(Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        format!("{}%", percent.normalize())
    }
}

/// Partial configuration; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    /// New tax rate.
    #[serde(alias = "taxRate")]
    pub tax_rate: Option<Decimal>,
    /// Turn tax on or off.
    #[serde(alias = "includeTax")]
    pub include_tax: Option<bool>,
    /// New per-unit shipping fee.
    #[serde(alias = "shippingFeePerItem")]
    pub shipping_fee_per_item: Option<Money>,
    /// Turn shipping on or off.
    #[serde(alias = "includeShipping")]
    pub include_shipping: Option<bool>,
    /// New currency symbol.
    pub currency: Option<String>,
    /// Replacement coupon catalog.
    pub coupons: Option<CouponCatalog>,
}

impl ConfigOverrides {
    /// Override the tax rate.
    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    /// Override whether tax is charged.
    pub fn include_tax(mut self, include: bool) -> Self {
        self.include_tax = Some(include);
        self
    }

    /// Override the per-unit shipping fee.
    pub fn shipping_fee_per_item(mut self, fee: Money) -> Self {
        self.shipping_fee_per_item = Some(fee);
        self
    }

    /// Override whether shipping is charged.
    pub fn include_shipping(mut self, include: bool) -> Self {
        self.include_shipping = Some(include);
        self
    }

    /// Override the currency symbol.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Replace the coupon catalog.
    pub fn coupons(mut self, coupons: CouponCatalog) -> Self {
        self.coupons = Some(coupons);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::coupon::CouponRule;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.tax_rate, Decimal::new(1, 1));
        assert!(config.include_tax);
        assert_eq!(config.shipping_fee_per_item, Money::from_major(1500));
        assert!(config.include_shipping);
        assert_eq!(config.currency, "₦");
        assert!(config.coupons.get("SAVE20").is_some());
        assert_eq!(config.tax_percentage(), "10%");
    }

    #[test]
    fn test_merge_is_shallow() {
        let overrides = ConfigOverrides::default()
            .tax_rate(Decimal::new(15, 2))
            .currency("$")
            .shipping_fee_per_item(Money::from_major(500))
            .coupons(CouponCatalog::new().with("ONLY5", CouponRule::Percentage(Decimal::from(5))));

        let config = CartConfig::default().with_overrides(overrides);

        assert_eq!(config.tax_rate, Decimal::new(15, 2));
        assert_eq!(config.currency, "$");
        assert_eq!(config.shipping_fee_per_item, Money::from_major(500));
        assert!(config.include_tax);
        assert!(config.include_shipping);
        assert_eq!(config.coupons.len(), 1);
        assert!(config.coupons.get("SAVE20").is_none());
        assert_eq!(config.tax_percentage(), "15%");
    }

    #[test]
    fn test_explicit_zero_rate_is_kept() {
        let config =
            CartConfig::default().with_overrides(ConfigOverrides::default().tax_rate(Decimal::ZERO));
        assert_eq!(config.tax_rate, Decimal::ZERO);
        assert_eq!(config.tax_percentage(), "0%");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CartConfig = toml::from_str(
            r#"
            tax_rate = 0.075
            include_shipping = false
            "#,
        )
        .unwrap();

        assert_eq!(config.tax_rate, Decimal::new(75, 3));
        assert!(!config.include_shipping);
        assert_eq!(config.currency, "₦");
        assert_eq!(config.coupons, CouponCatalog::default());
    }

    #[test]
    fn test_camel_case_aliases() {
        let overrides: ConfigOverrides =
            serde_json::from_str(r#"{"taxRate": 0.2, "includeShipping": false}"#).unwrap();
        assert_eq!(overrides.tax_rate, Some(Decimal::new(2, 1)));
        assert_eq!(overrides.include_shipping, Some(false));
        assert!(overrides.currency.is_none());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(CartConfig::default().validate().is_ok());

        let mut config = CartConfig::default();
        config.tax_rate = Decimal::new(15, 1);
        assert!(matches!(config.validate(), Err(CartError::InvalidConfig(_))));

        let mut config = CartConfig::default();
        config.shipping_fee_per_item = Money::from_major(-1);
        assert!(config.validate().is_err());
    }
}
