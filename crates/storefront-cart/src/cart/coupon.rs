//! Coupon codes and the catalog they are redeemed from.

use std::collections::BTreeMap;

use crate::error::CartError;
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Message returned for codes missing from the catalog.
pub const INVALID_COUPON_MESSAGE: &str = "Invalid coupon code";

/// Type of coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Percentage off the subtotal.
    Percentage,
    /// Shipping is not charged.
    FreeShipping,
}

/// The coupon currently applied to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Normalized (trimmed, uppercase) code.
    pub code: String,
    /// Type of coupon.
    #[serde(rename = "type")]
    pub kind: CouponKind,
    /// Percentage (0-100); always 0 for free shipping.
    pub value: Decimal,
}

impl Coupon {
    /// A percentage coupon.
    pub fn percentage(code: &str, percent: Decimal) -> Self {
        Self {
            code: normalize_code(code),
            kind: CouponKind::Percentage,
            value: percent,
        }
    }

    /// A free shipping coupon.
    pub fn free_shipping(code: &str) -> Self {
        Self {
            code: normalize_code(code),
            kind: CouponKind::FreeShipping,
            value: Decimal::ZERO,
        }
    }

    /// Check if this coupon waives shipping.
    pub fn is_free_shipping(&self) -> bool {
        self.kind == CouponKind::FreeShipping
    }

    /// Amount taken off the given subtotal.
    ///
    /// Free shipping coupons never discount the subtotal.
    pub fn discount_on(&self, subtotal: Money) -> Money {
        match self.kind {
            CouponKind::Percentage => subtotal.percentage(self.value),
            CouponKind::FreeShipping => Money::zero(),
        }
    }

    /// Confirmation shown to the shopper.
    pub fn applied_message(&self) -> String {
        match self.kind {
            CouponKind::Percentage => format!(
                "Coupon \"{}\" applied! {}% off",
                self.code,
                self.value.normalize()
            ),
            CouponKind::FreeShipping => format!("Coupon \"{}\" applied! Free shipping", self.code),
        }
    }
}

/// Marker entries in the coupon catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecialCoupon {
    /// `{ type = "free_shipping" }`
    FreeShipping,
}

/// A redeemable entry: a bare percentage or a marker object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CouponRule {
    /// Percentage off (0-100).
    Percentage(Decimal),
    /// Marker coupon.
    Special(SpecialCoupon),
}

impl CouponRule {
    /// Build the coupon this rule grants under `code`.
    pub fn redeem(&self, code: &str) -> Coupon {
        match self {
            CouponRule::Percentage(percent) => Coupon::percentage(code, *percent),
            CouponRule::Special(SpecialCoupon::FreeShipping) => Coupon::free_shipping(code),
        }
    }
}

/// Redeemable codes, keyed by uppercase code.
///
/// Keys are normalized on insert and on deserialization, so a config file
/// may spell codes in any case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, CouponRule>")]
pub struct CouponCatalog(BTreeMap<String, CouponRule>);

impl CouponCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace a code.
    pub fn insert(&mut self, code: &str, rule: CouponRule) {
        self.0.insert(normalize_code(code), rule);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, code: &str, rule: CouponRule) -> Self {
        self.insert(code, rule);
        self
    }

    /// Look up a code, ignoring case and surrounding whitespace.
    pub fn get(&self, code: &str) -> Option<&CouponRule> {
        self.0.get(&normalize_code(code))
    }

    /// Look up a code and build the coupon it grants.
    pub fn redeem(&self, code: &str) -> Option<Coupon> {
        self.get(code).map(|rule| rule.redeem(code))
    }

    /// Iterate codes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CouponRule)> {
        self.0.iter().map(|(code, rule)| (code.as_str(), rule))
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no codes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject percentages outside 0-100.
    pub fn validate(&self) -> Result<(), CartError> {
        for (code, rule) in self.iter() {
            if let CouponRule::Percentage(percent) = rule {
                if *percent < Decimal::ZERO || *percent > Decimal::ONE_HUNDRED {
                    return Err(CartError::InvalidConfig(format!(
                        "coupon {code}: percentage {percent} outside 0-100"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for CouponCatalog {
    /// The storefront's standard codes.
    fn default() -> Self {
        Self::new()
            .with("SAVE10", CouponRule::Percentage(Decimal::from(10)))
            .with("SAVE20", CouponRule::Percentage(Decimal::from(20)))
            .with("SAVE30", CouponRule::Percentage(Decimal::from(30)))
            .with("WELCOME15", CouponRule::Percentage(Decimal::from(15)))
            .with("FREESHIP", CouponRule::Special(SpecialCoupon::FreeShipping))
    }
}

impl From<BTreeMap<String, CouponRule>> for CouponCatalog {
    fn from(entries: BTreeMap<String, CouponRule>) -> Self {
        entries
            .into_iter()
            .fold(Self::new(), |catalog, (code, rule)| catalog.with(&code, rule))
    }
}

/// Result of [`CartEngine::apply_coupon`](crate::CartEngine::apply_coupon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponOutcome {
    /// Whether the code was accepted.
    pub success: bool,
    /// Message for the shopper.
    pub message: String,
    /// Normalized code as looked up.
    pub code: String,
    /// Coupon now applied, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,
}

impl CouponOutcome {
    pub(crate) fn applied(coupon: Coupon) -> Self {
        Self {
            success: true,
            message: coupon.applied_message(),
            code: coupon.code.clone(),
            coupon: Some(coupon),
        }
    }

    pub(crate) fn rejected(code: &str) -> Self {
        Self {
            success: false,
            message: INVALID_COUPON_MESSAGE.to_string(),
            code: normalize_code(code),
            coupon: None,
        }
    }

    /// Check if the code was accepted.
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Trim and uppercase a code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_discount() {
        let coupon = Coupon::percentage("save20", Decimal::from(20));
        assert_eq!(coupon.code, "SAVE20");
        assert_eq!(coupon.discount_on(Money::from_major(200)), Money::from_major(40));
    }

    #[test]
    fn test_free_shipping_has_no_subtotal_discount() {
        let coupon = Coupon::free_shipping("freeship");
        assert!(coupon.is_free_shipping());
        assert_eq!(coupon.value, Decimal::ZERO);
        assert_eq!(coupon.discount_on(Money::from_major(200)), Money::zero());
    }

    #[test]
    fn test_applied_messages() {
        assert_eq!(
            Coupon::percentage("SAVE20", Decimal::from(20)).applied_message(),
            "Coupon \"SAVE20\" applied! 20% off"
        );
        assert_eq!(
            Coupon::free_shipping("FREESHIP").applied_message(),
            "Coupon \"FREESHIP\" applied! Free shipping"
        );
    }

    #[test]
    fn test_default_catalog_lookup_ignores_case() {
        let catalog = CouponCatalog::default();
        assert_eq!(catalog.len(), 5);

        let coupon = catalog.redeem("  welcome15 ").unwrap();
        assert_eq!(coupon.code, "WELCOME15");
        assert_eq!(coupon.value, Decimal::from(15));

        assert!(catalog.redeem("BOGUS").is_none());
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog: CouponCatalog = toml::from_str(
            r#"
            save5 = 5
            HALF = 50.5
            ShipFree = { type = "free_shipping" }
            "#,
        )
        .unwrap();

        assert_eq!(
            catalog.get("SAVE5"),
            Some(&CouponRule::Percentage(Decimal::from(5)))
        );
        assert_eq!(
            catalog.redeem("half").map(|c| c.value),
            Some(Decimal::new(505, 1))
        );
        assert!(catalog.redeem("SHIPFREE").unwrap().is_free_shipping());
    }

    #[test]
    fn test_catalog_json_roundtrip_keeps_marker_shape() {
        let json = serde_json::to_value(CouponCatalog::default()).unwrap();
        assert_eq!(json["FREESHIP"], serde_json::json!({ "type": "free_shipping" }));

        let back: CouponCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, CouponCatalog::default());
    }

    #[test]
    fn test_catalog_validation() {
        assert!(CouponCatalog::default().validate().is_ok());

        let bad = CouponCatalog::new().with("TOOMUCH", CouponRule::Percentage(Decimal::from(150)));
        assert!(matches!(bad.validate(), Err(CartError::InvalidConfig(_))));
    }

    #[test]
    fn test_coupon_serializes_with_type_field() {
        let json = serde_json::to_value(Coupon::free_shipping("FREESHIP")).unwrap();
        assert_eq!(json["type"], "free_shipping");
        assert_eq!(json["code"], "FREESHIP");
    }

    #[test]
    fn test_rejected_outcome() {
        let outcome = CouponOutcome::rejected(" bogus ");
        assert!(!outcome.is_success());
        assert_eq!(outcome.code, "BOGUS");
        assert_eq!(outcome.message, INVALID_COUPON_MESSAGE);
        assert!(outcome.coupon.is_none());
    }
}
