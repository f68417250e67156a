//! The cart manager: session state, stock validation and persistence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{watch, Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use turbo_cache::{Cache, CacheError, KeyValueStore};

use crate::cart::{Cart, LineItem};
use crate::catalog::CatalogService;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::notify::{Notification, Notifier};

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@TurboCart:cart";

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Key holding the JSON-serialized cart.
    pub storage_key: String,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl CartSettings {
    /// Use a different storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// Result of an operation that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The cart changed and was persisted; carries the new cart.
    Committed(Cart),
    /// Nothing to change.
    Unchanged,
}

impl Outcome {
    /// Whether the operation changed the cart.
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }
}

/// Owns the cart for one session.
///
/// Every mutation validates against the catalog when it needs to, then
/// commits: the in-memory cart and the stored copy are replaced together and
/// subscribers see the new cart. Failures are reported to the [`Notifier`]
/// and returned as [`CartError`].
///
/// Mutations on the same product run one at a time, in call order.
/// Mutations on different products may overlap; each applies its change to
/// the cart as it is at commit time, so none of them is lost.
pub struct CartManager<S> {
    cache: Cache<S>,
    storage_key: String,
    catalog: Arc<dyn CatalogService>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<Cart>,
    commit_lock: Mutex<()>,
    product_locks: ProductLocks,
}

impl<S> std::fmt::Debug for CartManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("storage_key", &self.storage_key)
            .field("items", &self.state.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartManager<S> {
    /// Start a session, restoring the cart from `store`.
    ///
    /// A missing key starts an empty cart. A stored value that cannot be
    /// parsed is an error; it is left in place untouched.
    pub fn open(
        store: S,
        catalog: Arc<dyn CatalogService>,
        notifier: Arc<dyn Notifier>,
        settings: CartSettings,
    ) -> Result<Self, CartError> {
        let cache = Cache::new(store);
        let cart = match cache.get::<Cart>(&settings.storage_key) {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                let err = CartError::Load(e);
                warn!(key = %settings.storage_key, error = %err, "could not restore cart");
                notifier.notify(Notification::from(&err));
                return Err(err);
            }
        };

        info!(
            key = %settings.storage_key,
            items = cart.len(),
            units = cart.unit_count(),
            "cart session opened"
        );

        let (state, _) = watch::channel(cart);
        Ok(Self {
            cache,
            storage_key: settings.storage_key,
            catalog,
            notifier,
            state,
            commit_lock: Mutex::new(()),
            product_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Snapshot of the current cart.
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Receive every committed cart, starting from the current one.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    /// Storage key this session persists to.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        self.cache.store()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented by one if the stock
    /// ceiling allows it. A new product is fetched from the catalog and
    /// appended with quantity 1.
    pub async fn add_product(&self, product_id: ProductId) -> Result<Outcome, CartError> {
        let result = self.try_add_product(product_id).await;
        self.report(&result);
        result
    }

    /// Remove a product from the cart.
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Outcome, CartError> {
        let result = self.try_remove_product(product_id).await;
        self.report(&result);
        result
    }

    /// Set the quantity of a product to exactly `amount`.
    ///
    /// `amount <= 0` is ignored. Amounts above the stock ceiling are
    /// rejected.
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Outcome, CartError> {
        let result = self.try_update_product_amount(product_id, amount).await;
        self.report(&result);
        result
    }

    /// End the session and hand back the final cart.
    ///
    /// Taking `self` by value means no operation can still be in flight.
    pub fn close(self) -> Cart {
        let cart = self.cart();
        info!(
            key = %self.storage_key,
            items = cart.len(),
            units = cart.unit_count(),
            "cart session closed"
        );
        cart
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<Outcome, CartError> {
        let _guard = self.lock_product(product_id).await;

        let current = self.state.borrow().quantity_of(product_id);
        let committed = match current {
            Some(current) => {
                let stock = self
                    .catalog
                    .stock(product_id)
                    .await
                    .map_err(|e| CartError::add_failed(product_id, e))?;

                let requested = u64::from(current) + 1;
                let Some(amount) = u32::try_from(requested)
                    .ok()
                    .filter(|_| stock.allows(requested))
                else {
                    return Err(CartError::StockExceeded {
                        product_id,
                        requested,
                        available: stock.amount,
                    });
                };

                self.commit(|cart| cart.set_amount(product_id, amount))
                    .map_err(|e| CartError::add_failed(product_id, e))?
            }
            None => {
                let product = self
                    .catalog
                    .product(product_id)
                    .await
                    .map_err(|e| CartError::add_failed(product_id, e))?;

                self.commit(|cart| cart.push(LineItem::new(product)))
                    .map_err(|e| CartError::add_failed(product_id, e))?
            }
        };

        debug!(%product_id, "product added");
        Ok(committed)
    }

    async fn try_remove_product(&self, product_id: ProductId) -> Result<Outcome, CartError> {
        let _guard = self.lock_product(product_id).await;

        match self.commit(|cart| cart.remove(product_id).is_some()) {
            Ok(Outcome::Unchanged) => Err(CartError::NotInCart(product_id)),
            Ok(committed) => {
                debug!(%product_id, "product removed");
                Ok(committed)
            }
            Err(e) => Err(CartError::remove_failed(product_id, e)),
        }
    }

    async fn try_update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Outcome, CartError> {
        if amount <= 0 {
            debug!(%product_id, amount, "ignoring non-positive amount");
            return Ok(Outcome::Unchanged);
        }
        let requested = amount.unsigned_abs();

        let _guard = self.lock_product(product_id).await;

        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|e| CartError::update_failed(product_id, e))?;

        let Some(amount) = u32::try_from(requested)
            .ok()
            .filter(|_| stock.allows(requested))
        else {
            return Err(CartError::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        };

        let committed = self
            .commit(|cart| cart.set_amount(product_id, amount))
            .map_err(|e| CartError::update_failed(product_id, e))?;

        if committed.is_committed() {
            debug!(%product_id, amount, "product amount updated");
        } else {
            debug!(%product_id, "product not in cart, nothing to update");
        }
        Ok(committed)
    }

    /// Apply `mutate` to the current cart and persist the result.
    ///
    /// `mutate` returns whether it changed anything; if not, nothing is
    /// written. Memory is only updated after the store accepted the write.
    fn commit<F>(&self, mutate: F) -> Result<Outcome, CacheError>
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut next = self.state.borrow().clone();
        if !mutate(&mut next) {
            return Ok(Outcome::Unchanged);
        }

        self.cache.set(&self.storage_key, &next)?;
        self.state.send_replace(next.clone());
        Ok(Outcome::Committed(next))
    }

    async fn lock_product(&self, product_id: ProductId) -> ProductGuard<'_> {
        let lock = {
            let mut locks = self
                .product_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(product_id).or_default())
        };
        ProductGuard {
            locks: &self.product_locks,
            product_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn report(&self, result: &Result<Outcome, CartError>) {
        if let Err(err) = result {
            warn!(product_id = ?err.product_id(), error = %err, "cart operation failed");
            self.notifier.notify(Notification::from(err));
        }
    }
}

type ProductLocks = Mutex<HashMap<ProductId, Arc<AsyncMutex<()>>>>;

/// Holds a product's operation lock; drops the map entry once nobody else
/// holds or waits on it.
struct ProductGuard<'a> {
    locks: &'a ProductLocks,
    product_id: ProductId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ProductGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters clone the Arc under the map lock, so a count of one means
        // only the map itself still refers to it.
        self.guard.take();
        if locks
            .get(&self.product_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.product_id);
        }
    }
}
