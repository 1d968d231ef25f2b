//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up a product key with a SKU
//! or any other free-form string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Check if the ID is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Stable product key; one line item per product.
    ProductId
);
define_id!(
    /// Stock keeping unit.
    Sku
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrips_as_plain_string() {
        let id = ProductId::new("123");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""123""#);

        let back: ProductId = serde_json::from_str(r#""123""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_conversions() {
        let id: ProductId = "abc".into();
        assert_eq!(id.as_str(), "abc");
        assert_eq!(id.to_string(), "abc");
        assert!(!id.is_empty());
        assert!(ProductId::from(String::new()).is_empty());
    }
}
