//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_cart::CartConfig;

/// File names searched for, in order, in each directory up the tree.
pub const CONFIG_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart pricing configuration.
    #[serde(default)]
    pub cart: CartConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content, is_json(path))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse config text as JSON or TOML.
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Generate a default storefront.toml config file.
pub fn generate_default_config() -> String {
    r#"# Storefront cart configuration

[cart]
# Tax as a fraction of the subtotal.
tax_rate = 0.1
include_tax = true
# Shipping charged per unit in the cart.
shipping_fee_per_item = 1500
include_shipping = true
currency = "₦"

# Coupon codes: a percentage off the subtotal, or free shipping.
# Listing coupons here replaces the built-in codes.
[cart.coupons]
SAVE10 = 10
SAVE20 = 20
SAVE30 = 30
WELCOME15 = 15
FREESHIP = { type = "free_shipping" }
"#
    .to_string()
}
