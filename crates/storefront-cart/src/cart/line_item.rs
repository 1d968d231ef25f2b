//! Line items and the product input they are built from.

use crate::error::CartError;
use crate::ids::{ProductId, Sku};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One product entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product key. Unique within a cart.
    pub id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Quantity, always at least 1.
    pub quantity: u32,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Stock keeping unit.
    #[serde(default)]
    pub sku: Option<Sku>,
}

impl LineItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// A product as submitted by an "add to cart" action.
///
/// Every field is optional so incomplete input can be represented and
/// rejected by [`CartEngine::add_item`](crate::CartEngine::add_item) instead
/// of failing at deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductInput {
    /// Product key (required, non-empty).
    pub id: Option<ProductId>,
    /// Product name (required, non-empty).
    pub name: Option<String>,
    /// Unit price (required, not negative).
    pub price: Option<Money>,
    /// Quantity to add; missing or zero means 1.
    pub quantity: Option<u32>,
    /// Image URL.
    pub image: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Stock keeping unit.
    pub sku: Option<Sku>,
}

impl ProductInput {
    /// Create input carrying the required fields.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            price: Some(price),
            ..Self::default()
        }
    }

    /// Set the quantity to add.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the SKU.
    pub fn with_sku(mut self, sku: impl Into<Sku>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Quantity this input adds to the cart.
    pub fn requested_quantity(&self) -> u32 {
        match self.quantity {
            Some(quantity) if quantity > 0 => quantity,
            _ => 1,
        }
    }

    /// Check the required fields and build a fresh line item.
    pub(crate) fn into_line_item(self) -> Result<LineItem, CartError> {
        let quantity = self.requested_quantity();

        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CartError::InvalidProduct("missing id".to_string()))?;
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CartError::InvalidProduct(format!("{id}: missing name")))?;
        let price = self
            .price
            .ok_or_else(|| CartError::InvalidProduct(format!("{id}: missing price")))?;
        if price.is_negative() {
            return Err(CartError::InvalidProduct(format!(
                "{id}: negative price {price}"
            )));
        }

        Ok(LineItem {
            id,
            name,
            price,
            quantity,
            image: self.image.filter(|s| !s.is_empty()),
            category: self.category.filter(|s| !s.is_empty()),
            sku: self.sku.filter(|s| !s.is_empty()),
        })
    }
}
