//! Cart error types.

use crate::ids::ProductId;
use thiserror::Error;
use turbo_cache::CacheError;
use turbo_data::FetchError;

/// Errors from the catalog and stock service.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The backend has no record for the product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The request failed or the response could not be read.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Underlying reason a cart operation could not complete.
#[derive(Error, Debug)]
pub enum FailureCause {
    /// Fetching the stock ceiling or catalog record failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Persisting the cart failed.
    #[error(transparent)]
    Storage(#[from] CacheError),
}

/// Errors returned by cart operations.
///
/// Every variant is also surfaced to the user as a notification by the
/// manager; the variant lets callers tell the causes apart.
#[derive(Error, Debug)]
pub enum CartError {
    /// The requested quantity is above the stock ceiling.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// Removal of a product that is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Adding a product failed.
    #[error("Failed to add product {product_id}: {cause}")]
    AddFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    /// Updating a quantity failed.
    #[error("Failed to update product {product_id}: {cause}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    /// Removing a product failed after it was found.
    #[error("Failed to remove product {product_id}: {cause}")]
    RemoveFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    /// The stored cart could not be read when the session opened.
    #[error("Failed to load cart: {0}")]
    Load(#[source] CacheError),
}

impl CartError {
    pub(crate) fn add_failed(product_id: ProductId, cause: impl Into<FailureCause>) -> Self {
        CartError::AddFailed {
            product_id,
            cause: cause.into(),
        }
    }

    pub(crate) fn update_failed(product_id: ProductId, cause: impl Into<FailureCause>) -> Self {
        CartError::UpdateFailed {
            product_id,
            cause: cause.into(),
        }
    }

    pub(crate) fn remove_failed(product_id: ProductId, cause: impl Into<FailureCause>) -> Self {
        CartError::RemoveFailed {
            product_id,
            cause: cause.into(),
        }
    }

    /// Product the failed operation was about, if any.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            CartError::StockExceeded { product_id, .. }
            | CartError::AddFailed { product_id, .. }
            | CartError::UpdateFailed { product_id, .. }
            | CartError::RemoveFailed { product_id, .. } => Some(*product_id),
            CartError::NotInCart(product_id) => Some(*product_id),
            CartError::Load(_) => None,
        }
    }
}
