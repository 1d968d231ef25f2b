//! Store handle identity.

use serde::{Deserialize, Serialize};

/// Identifies the handle that wrote a slot.
///
/// Every [`MemoryStore`](crate::MemoryStore) handle gets its own origin so
/// change feeds can skip notifications caused by their own writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginId(String);

impl OriginId {
    /// Create an origin ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random origin ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 12] = rand::thread_rng().gen();
        Self(format!("ctx_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the origin ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OriginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OriginId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_origins_differ() {
        let a = OriginId::generate();
        let b = OriginId::generate();

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("ctx_"));
    }

    #[test]
    fn test_display_matches_inner() {
        let id = OriginId::new("ctx_checkout");
        assert_eq!(id.to_string(), "ctx_checkout");
    }
}
