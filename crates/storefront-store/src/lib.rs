//! Shared in-memory key/value slots for the storefront cart.
//!
//! A [`MemoryStore`] plays the role of the page-wide state slot: every
//! handle cloned from it reads and writes the same slots, values are stored
//! as JSON, and each write is announced to the other handles through a
//! [`ChangeFeed`]. A handle never sees its own writes on its feed, the same
//! way a browser tab does not receive `storage` events for its own writes.
//!
//! # Example
//!
//! ```rust
//! use storefront_store::MemoryStore;
//!
//! let widget = MemoryStore::new();
//! let checkout = widget.handle();
//! let mut feed = checkout.watch();
//!
//! widget.set("cart:state", &vec!["sku-1"])?;
//!
//! assert_eq!(feed.try_next().map(|c| c.key), Some("cart:state".to_string()));
//! let items: Option<Vec<String>> = checkout.get("cart:state")?;
//! assert_eq!(items, Some(vec!["sku-1".to_string()]));
//! # Ok::<(), storefront_store::StoreError>(())
//! ```

mod change;
mod error;
mod kv;
mod origin;

pub use change::{ChangeFeed, StoreChange};
pub use error::StoreError;
pub use kv::MemoryStore;
pub use origin::OriginId;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{ChangeFeed, MemoryStore, OriginId, StoreChange, StoreError};
}
