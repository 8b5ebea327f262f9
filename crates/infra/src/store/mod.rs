//! Product persistence boundary.
//!
//! `ProductStore` owns every product record. Callers go through it for all
//! reads and writes; nothing else mutates stored products.

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryProductStore;
pub use sqlite::SqliteProductStore;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use catalog_core::{DomainError, ProductId};
use catalog_products::{Product, ProductDetails};

/// Store error taxonomy.
///
/// Input validation is the caller's job; the store only reports missing
/// records and storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl StoreError {
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

/// What `soft_delete`/`restore` do when no record has the given id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingIdPolicy {
    /// Report success without touching anything.
    #[default]
    Ignore,
    /// Fail with `StoreError::NotFound`.
    Reject,
}

impl MissingIdPolicy {
    /// Turn an affected-row count into the operation's result.
    pub fn check(self, id: ProductId, rows_affected: u64) -> Result<(), StoreError> {
        match (self, rows_affected) {
            (MissingIdPolicy::Reject, 0) => Err(StoreError::NotFound(id)),
            _ => Ok(()),
        }
    }
}

impl FromStr for MissingIdPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(MissingIdPolicy::Ignore),
            "reject" => Ok(MissingIdPolicy::Reject),
            other => Err(DomainError::validation(format!(
                "missing-id policy must be one of: ignore, reject (got {other:?})"
            ))),
        }
    }
}

/// Number of active and deleted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductCounts {
    pub active: u64,
    pub deleted: u64,
}

/// Durable collection of product records.
///
/// Every operation is a single round-trip to storage and is safe to call
/// concurrently through a shared handle. List operations return records in
/// ascending id order.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new active product and return its freshly issued id.
    async fn create(&self, details: ProductDetails) -> Result<ProductId, StoreError>;

    /// Look up a product regardless of its active/deleted state.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Like `get`, but absence is an error.
    async fn fetch(&self, id: ProductId) -> Result<Product, StoreError> {
        self.get(id).await?.ok_or(StoreError::NotFound(id))
    }

    /// All products whose `deleted_at` is unset.
    async fn list_active(&self) -> Result<Vec<Product>, StoreError>;

    /// All products in `category` (exact, case-sensitive), active or deleted.
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError>;

    /// All products whose `deleted_at` is set.
    async fn list_deleted(&self) -> Result<Vec<Product>, StoreError>;

    /// Overwrite all mutable fields of an existing product.
    async fn update(&self, id: ProductId, details: ProductDetails) -> Result<(), StoreError>;

    /// Mark a product deleted. Missing ids follow the store's `MissingIdPolicy`.
    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError>;

    /// Clear a product's deletion mark. Missing ids follow the store's `MissingIdPolicy`.
    async fn restore(&self, id: ProductId) -> Result<(), StoreError>;

    async fn count(&self) -> Result<ProductCounts, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn create(&self, details: ProductDetails) -> Result<ProductId, StoreError> {
        (**self).create(details).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn fetch(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).fetch(id).await
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_active().await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        (**self).list_by_category(category).await
    }

    async fn list_deleted(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_deleted().await
    }

    async fn update(&self, id: ProductId, details: ProductDetails) -> Result<(), StoreError> {
        (**self).update(id, details).await
    }

    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).soft_delete(id).await
    }

    async fn restore(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).restore(id).await
    }

    async fn count(&self) -> Result<ProductCounts, StoreError> {
        (**self).count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_policy_accepts_zero_rows() {
        let id = ProductId::FIRST;
        assert_eq!(MissingIdPolicy::Ignore.check(id, 0), Ok(()));
        assert_eq!(MissingIdPolicy::Ignore.check(id, 1), Ok(()));
    }

    #[test]
    fn reject_policy_reports_not_found_on_zero_rows() {
        let id = ProductId::FIRST;
        assert_eq!(MissingIdPolicy::Reject.check(id, 0), Err(StoreError::NotFound(id)));
        assert_eq!(MissingIdPolicy::Reject.check(id, 1), Ok(()));
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Reject".parse::<MissingIdPolicy>().unwrap(), MissingIdPolicy::Reject);
        assert_eq!(" ignore ".parse::<MissingIdPolicy>().unwrap(), MissingIdPolicy::Ignore);
        assert!("strict".parse::<MissingIdPolicy>().is_err());
    }
}
