//! Order placement.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cart::{CartEngine, Coupon, ExportTotals, SummaryLine};
use crate::checkout::{Customer, ShippingAddress};
use crate::error::CartError;
use crate::store::StateStore;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Check an address has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    BankTransfer,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::CashOnDelivery => "Cash on delivery",
        }
    }
}

/// Payment block of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
}

/// What the checkout form collects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDetails {
    pub customer: Customer,
    pub shipping: ShippingAddress,
    pub payment: Payment,
}

impl OrderDetails {
    /// Check required fields and the email shape.
    pub fn validate(&self) -> Result<(), CartError> {
        self.customer.check_complete()?;
        self.shipping.check_complete()?;
        if !is_valid_email(&self.customer.email) {
            return Err(CartError::InvalidEmail(self.customer.email.clone()));
        }
        Ok(())
    }
}

/// Payload submitted to the order API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer: Customer,
    pub shipping: ShippingAddress,
    pub payment: Payment,
    pub items: Vec<SummaryLine>,
    pub totals: ExportTotals,
    pub coupon: Option<Coupon>,
    /// Serialized as RFC 3339.
    pub order_date: DateTime<Utc>,
}

/// Turn the cart into an order request and clear the cart.
///
/// # Errors
///
/// - [`CartError::EmptyCart`] if there is nothing to order
/// - [`CartError::CheckoutIncomplete`] naming the first blank field
/// - [`CartError::InvalidEmail`] if the email is malformed
///
/// The cart is left untouched on error.
pub fn place_order<S: StateStore>(
    engine: &mut CartEngine<S>,
    details: OrderDetails,
    placed_at: DateTime<Utc>,
) -> Result<OrderRequest, CartError> {
    if engine.is_empty() {
        return Err(CartError::EmptyCart);
    }
    details.validate()?;

    let summary = engine.cart_summary();
    let mut shipping = details.shipping;
    shipping.apartment = shipping.apartment.filter(|a| !a.trim().is_empty());

    let order = OrderRequest {
        customer: details.customer,
        shipping,
        payment: details.payment,
        totals: summary.totals(),
        items: summary.items,
        coupon: summary.applied_coupon,
        order_date: placed_at,
    };

    tracing::info!(
        email = %order.customer.email,
        payment = order.payment.method.as_str(),
        items = order.items.len(),
        total = %order.totals.total,
        "order placed"
    );

    engine.clear_cart();
    Ok(order)
}
