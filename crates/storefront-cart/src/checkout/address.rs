//! Customer and shipping address types.

use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// Contact details of the person placing the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    /// Create a customer.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Get full name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub(crate) fn check_complete(&self) -> Result<(), CartError> {
        require("first name", &self.first_name)?;
        require("last name", &self.last_name)?;
        require("email", &self.email)?;
        require("phone", &self.phone)
    }
}

/// Where the order ships to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    /// Street address.
    pub address: String,
    /// Apartment, suite, etc.
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Create an address without an apartment line.
    pub fn new(
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            apartment: None,
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    /// Set the apartment line.
    pub fn with_apartment(mut self, apartment: impl Into<String>) -> Self {
        self.apartment = Some(apartment.into());
        self
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.address.as_str()];
        if let Some(apartment) = self.apartment.as_deref() {
            parts.push(apartment);
        }
        parts.extend([
            self.city.as_str(),
            self.state.as_str(),
            self.postal_code.as_str(),
            self.country.as_str(),
        ]);
        parts.join(", ")
    }

    pub(crate) fn check_complete(&self) -> Result<(), CartError> {
        require("address", &self.address)?;
        require("city", &self.city)?;
        require("state", &self.state)?;
        require("postal code", &self.postal_code)?;
        require("country", &self.country)
    }
}

fn require(field: &str, value: &str) -> Result<(), CartError> {
    if value.trim().is_empty() {
        return Err(CartError::CheckoutIncomplete(field.to_string()));
    }
    Ok(())
}
