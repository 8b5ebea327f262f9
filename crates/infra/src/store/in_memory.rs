//! In-memory product store for tests/dev.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use catalog_core::ProductId;
use catalog_products::{Product, ProductDetails};

use super::{MissingIdPolicy, ProductCounts, ProductStore, StoreError};

#[derive(Debug)]
struct State {
    next_id: ProductId,
    products: BTreeMap<ProductId, Product>,
}

/// Process-local product store.
///
/// Same observable semantics as `SqliteProductStore`, minus durability.
#[derive(Debug)]
pub struct InMemoryProductStore {
    inner: RwLock<State>,
    missing_id: MissingIdPolicy,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::with_policy(MissingIdPolicy::default())
    }

    pub fn with_policy(missing_id: MissingIdPolicy) -> Self {
        Self {
            inner: RwLock::new(State {
                next_id: ProductId::FIRST,
                products: BTreeMap::new(),
            }),
            missing_id,
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::persistence("in-memory product store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::persistence("in-memory product store lock poisoned"))
    }

    fn select(&self, predicate: impl Fn(&Product) -> bool) -> Result<Vec<Product>, StoreError> {
        let state = self.read()?;
        Ok(state
            .products
            .values()
            .filter(|p| predicate(p))
            .cloned()
            .collect())
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, details: ProductDetails) -> Result<ProductId, StoreError> {
        let mut state = self.write()?;
        let id = state.next_id;
        state.next_id = id.next();
        state.products.insert(id, Product::new(id, details, Utc::now()));
        Ok(id)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        self.select(|p| !p.is_deleted())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        self.select(|p| p.category() == category)
    }

    async fn list_deleted(&self) -> Result<Vec<Product>, StoreError> {
        self.select(Product::is_deleted)
    }

    async fn update(&self, id: ProductId, details: ProductDetails) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let product = state
            .products
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        product.apply_details(details, Utc::now());
        Ok(())
    }

    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let affected = match state.products.get_mut(&id) {
            Some(product) => {
                product.soft_delete(Utc::now());
                1
            }
            None => 0,
        };
        self.missing_id.check(id, affected)
    }

    async fn restore(&self, id: ProductId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let affected = match state.products.get_mut(&id) {
            Some(product) => {
                product.restore();
                1
            }
            None => 0,
        };
        self.missing_id.check(id, affected)
    }

    async fn count(&self) -> Result<ProductCounts, StoreError> {
        let state = self.read()?;
        let deleted = state.products.values().filter(|p| p.is_deleted()).count() as u64;
        Ok(ProductCounts {
            active: state.products.len() as u64 - deleted,
            deleted,
        })
    }
}
