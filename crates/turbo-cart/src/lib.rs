//! Shopping-cart state management for TurboCart storefronts.
//!
//! This crate provides the client-side cart of a storefront:
//!
//! - **Cart**: ordered line items, unique per product, with derived totals
//! - **Catalog**: the stock and product service the cart validates against
//! - **Manager**: add / remove / update operations with stock checks,
//!   persistence on every change, and change subscriptions
//! - **Notifications**: user-facing messages for failed operations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turbo_cart::prelude::*;
//! use turbo_cache::FileStore;
//! use turbo_data::FetchClient;
//!
//! let catalog = HttpCatalog::new(FetchClient::new().with_base_url("http://localhost:3333"));
//! let manager = CartManager::open(
//!     FileStore::open(".turbo-cart")?,
//!     Arc::new(catalog),
//!     Arc::new(TracingNotifier),
//!     CartSettings::default(),
//! )?;
//!
//! manager.add_product(ProductId::new(1)).await?;
//! manager.update_product_amount(ProductId::new(1), 3).await?;
//! println!("Total: {}", manager.cart().total().unwrap_or_default());
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod manager;
pub mod notify;
pub mod price;
pub mod product;

pub use cart::{Cart, InvalidCart, LineItem};
pub use catalog::{CatalogService, HttpCatalog, InMemoryCatalog};
pub use error::{CartError, CatalogError, FailureCause};
pub use ids::ProductId;
pub use manager::{CartManager, CartSettings, Outcome, DEFAULT_STORAGE_KEY};
pub use notify::{ChannelNotifier, Notification, Notifier, TracingNotifier};
pub use price::Price;
pub use product::{Product, Stock};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, LineItem};
    pub use crate::catalog::{CatalogService, HttpCatalog, InMemoryCatalog};
    pub use crate::error::{CartError, CatalogError};
    pub use crate::ids::ProductId;
    pub use crate::manager::{CartManager, CartSettings, Outcome};
    pub use crate::notify::{ChannelNotifier, Notification, Notifier, TracingNotifier};
    pub use crate::price::Price;
    pub use crate::product::{Product, Stock};
}
