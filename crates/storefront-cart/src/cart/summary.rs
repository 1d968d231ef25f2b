//! Read-only projections of the cart: the rendering summary and the order
//! export consumed by the order API.

use crate::cart::config::CartConfig;
use crate::cart::coupon::Coupon;
use crate::cart::line_item::LineItem;
use crate::cart::pricing::CartTotals;
use crate::ids::{ProductId, Sku};
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the rendering summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    /// Product key.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Quantity.
    pub quantity: u32,
    /// Image URL.
    pub image: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Stock keeping unit.
    pub sku: Option<Sku>,
    /// Unit price times quantity.
    pub line_total: Money,
    /// `line_total` with the currency symbol.
    pub line_total_formatted: String,
}

/// Snapshot of everything a cart view renders.
///
/// Built without touching the cart, so building it twice without a mutation
/// in between yields equal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<SummaryLine>,
    pub subtotal: Money,
    pub subtotal_formatted: String,
    pub tax: Money,
    pub tax_formatted: String,
    pub tax_rate: Decimal,
    pub tax_percentage: String,
    pub include_tax: bool,
    pub shipping: Money,
    pub shipping_formatted: String,
    pub include_shipping: bool,
    pub discount: Money,
    pub discount_formatted: String,
    pub applied_coupon: Option<Coupon>,
    pub total: Money,
    pub total_formatted: String,
    pub item_count: u64,
    pub unique_item_count: usize,
    pub is_empty: bool,
    pub currency: String,
}

impl CartSummary {
    /// Project the given cart state.
    pub fn build(items: &[LineItem], coupon: Option<&Coupon>, config: &CartConfig) -> Self {
        let totals = CartTotals::calculate(items, coupon, config);
        let symbol = config.currency.as_str();

        Self {
            items: items
                .iter()
                .map(|item| {
                    let line_total = item.line_total();
                    SummaryLine {
                        id: item.id.clone(),
                        name: item.name.clone(),
                        price: item.price,
                        quantity: item.quantity,
                        image: item.image.clone(),
                        category: item.category.clone(),
                        sku: item.sku.clone(),
                        line_total,
                        line_total_formatted: line_total.display(symbol),
                    }
                })
                .collect(),
            subtotal: totals.subtotal,
            subtotal_formatted: totals.subtotal.display(symbol),
            tax: totals.tax,
            tax_formatted: totals.tax.display(symbol),
            tax_rate: config.tax_rate,
            tax_percentage: config.tax_percentage(),
            include_tax: config.include_tax,
            shipping: totals.shipping,
            shipping_formatted: totals.shipping.display(symbol),
            include_shipping: config.include_shipping,
            discount: totals.discount,
            discount_formatted: totals.discount.display(symbol),
            applied_coupon: coupon.cloned(),
            total: totals.total,
            total_formatted: totals.total.display(symbol),
            item_count: totals.item_count,
            unique_item_count: totals.unique_item_count,
            is_empty: items.is_empty(),
            currency: config.currency.clone(),
        }
    }

    /// The totals this summary was built from.
    pub fn totals(&self) -> ExportTotals {
        ExportTotals {
            subtotal: self.subtotal,
            tax: self.tax,
            shipping: self.shipping,
            discount: self.discount,
            total: self.total,
        }
    }
}

/// Line in the order export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub subtotal: Money,
}

/// Totals block of the order export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
}

/// Payload for the order submission endpoint.
///
/// Field names and nesting are part of the API contract:
/// `{ items: [{productId, name, price, quantity, subtotal}], summary: {...},
/// coupon, itemCount }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderExport {
    pub items: Vec<ExportLine>,
    pub summary: ExportTotals,
    pub coupon: Option<Coupon>,
    pub item_count: u64,
}

impl OrderExport {
    /// Project the given cart state.
    pub fn build(items: &[LineItem], coupon: Option<&Coupon>, config: &CartConfig) -> Self {
        let totals = CartTotals::calculate(items, coupon, config);

        Self {
            items: items
                .iter()
                .map(|item| ExportLine {
                    product_id: item.id.clone(),
                    name: item.name.clone(),
                    price: item.price,
                    quantity: item.quantity,
                    subtotal: item.line_total(),
                })
                .collect(),
            summary: ExportTotals {
                subtotal: totals.subtotal,
                tax: totals.tax,
                shipping: totals.shipping,
                discount: totals.discount,
                total: totals.total,
            },
            coupon: coupon.cloned(),
            item_count: totals.item_count,
        }
    }
}
