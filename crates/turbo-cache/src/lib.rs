//! Type-safe Key-Value storage layer for TurboCart.
//!
//! Provides a simple, ergonomic API for persisting data in a key-value store
//! with automatic JSON serialization. Two backends ship with the crate:
//! [`MemoryStore`] for tests and throwaway sessions, and [`FileStore`] for
//! state that must survive a restart.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::{Cache, FileStore};
//!
//! let cache = Cache::new(FileStore::open(".turbo-cart")?);
//!
//! // Store a value
//! cache.set("@TurboCart:cart", &items)?;
//!
//! // Retrieve a value
//! let items: Option<Vec<LineItem>> = cache.get("@TurboCart:cart")?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore};
}
