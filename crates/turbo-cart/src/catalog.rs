//! Catalog and stock service access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use turbo_data::{ClientRequestBuilder, FetchClient, FetchError, Response};

use crate::error::CatalogError;
use crate::ids::ProductId;
use crate::product::{Product, Stock};

/// Read-only view of the backend's products and stock levels.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Current stock ceiling for a product.
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError>;

    /// Full catalog record for a product.
    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError>;
}

/// Catalog backed by the storefront REST API.
///
/// Issues `GET stock/{id}` and `GET products/{id}` relative to the client's
/// base URL.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: FetchClient,
}

impl HttpCatalog {
    /// Create a catalog over a configured client.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    fn stock_request(&self, product_id: ProductId) -> ClientRequestBuilder {
        self.client.get(format!("stock/{}", product_id))
    }

    fn product_request(&self, product_id: ProductId) -> ClientRequestBuilder {
        self.client.get(format!("products/{}", product_id))
    }
}

async fn fetch<T: DeserializeOwned>(
    product_id: ProductId,
    request: ClientRequestBuilder,
) -> Result<T, CatalogError> {
    let response = request.send().await?;
    decode(product_id, response)
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        let stock: Stock = fetch(product_id, self.stock_request(product_id)).await?;
        debug!(%product_id, ceiling = stock.amount, "fetched stock");
        Ok(stock)
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        let product: Product = fetch(product_id, self.product_request(product_id)).await?;
        debug!(%product_id, title = %product.title, "fetched product");
        Ok(product)
    }
}

fn decode<T: DeserializeOwned>(
    product_id: ProductId,
    response: Response,
) -> Result<T, CatalogError> {
    if response.is_not_found() {
        return Err(CatalogError::NotFound(product_id));
    }
    Ok(response.error_for_status()?.json()?)
}

/// In-process catalog for tests and offline development.
///
/// Counts the fetches it serves and can add latency or simulate an
/// unreachable backend.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, u32>>,
    latency: Option<Duration>,
    offline: AtomicBool,
    stock_fetches: AtomicUsize,
    product_fetches: AtomicUsize,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with its stock ceiling.
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.insert(product, stock);
        self
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add or replace a product.
    pub fn insert(&self, product: Product, stock: u32) {
        let id = product.id;
        lock(&self.products).insert(id, product);
        lock(&self.stock).insert(id, stock);
    }

    /// Change a product's stock ceiling.
    pub fn set_stock(&self, product_id: ProductId, amount: u32) {
        lock(&self.stock).insert(product_id, amount);
    }

    /// Make every request fail as if the backend were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stock lookups served.
    pub fn stock_fetches(&self) -> usize {
        self.stock_fetches.load(Ordering::SeqCst)
    }

    /// Number of product lookups served.
    pub fn product_fetches(&self) -> usize {
        self.product_fetches.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<(), CatalogError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::RequestError("connection refused".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        self.stock_fetches.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        lock(&self.stock)
            .get(&product_id)
            .map(|amount| Stock::new(product_id, *amount))
            .ok_or(CatalogError::NotFound(product_id))
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        self.product_fetches.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        lock(&self.products)
            .get(&product_id)
            .cloned()
            .ok_or(CatalogError::NotFound(product_id))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
