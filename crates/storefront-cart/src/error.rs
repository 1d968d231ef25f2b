//! Cart error types.

use thiserror::Error;

/// Errors that can occur in cart and checkout operations.
///
/// Cart mutations other than [`add_item`](crate::CartEngine::add_item) never
/// return these; unknown product ids are silent no-ops and store failures are
/// logged.
#[derive(Error, Debug)]
pub enum CartError {
    /// Product is missing a required field or carries an invalid value.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout incomplete.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// Email address failed validation.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Shared state slot failure.
    #[error("Store error: {0}")]
    Store(#[from] storefront_store::StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CartError {
    fn from(e: serde_json::Error) -> Self {
        CartError::SerializationError(e.to_string())
    }
}
