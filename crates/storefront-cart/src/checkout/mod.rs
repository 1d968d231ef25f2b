//! Checkout module.
//!
//! Turns a cart into an order request for the order API.

mod address;
mod order;

pub use address::{Customer, ShippingAddress};
pub use order::{is_valid_email, place_order, OrderDetails, OrderRequest, Payment, PaymentMethod};
