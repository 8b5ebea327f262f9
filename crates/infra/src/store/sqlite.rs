//! SQLite-backed product store.
//!
//! ## Error Mapping
//!
//! Every sqlx failure becomes `StoreError::Persistence`, tagged with the
//! operation name:
//!
//! | SQLx Error | Scenario |
//! |------------|----------|
//! | Database | Constraint violation or other engine error |
//! | PoolClosed | Store used after `close()` |
//! | Io / Tls / Protocol | File or connection failure |
//! | ColumnDecode | A stored row no longer fits the `Product` shape |
//!
//! `StoreError::NotFound` is never produced by sqlx itself; it comes from
//! affected-row checks in `update` and (under `MissingIdPolicy::Reject`) in
//! `soft_delete`/`restore`.
//!
//! ## Concurrency
//!
//! `SqliteProductStore` is `Send + Sync` and cheap to clone. Every mutation is
//! a single `UPDATE`/`INSERT` statement, so SQLite's per-statement atomicity is
//! the only guard needed: there is no read-then-write window. WAL journaling
//! lets readers proceed while a write is in flight.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{instrument, Span};

use catalog_core::ProductId;
use catalog_products::{Product, ProductDetails};

use super::{MissingIdPolicy, ProductCounts, ProductStore, StoreError};
use crate::config::StoreConfig;

/// Schema bootstrap. Idempotent; later changes may only add columns.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT    NOT NULL,
        description TEXT    NULL,
        price       REAL    NOT NULL,
        quantity    INTEGER NOT NULL CHECK (quantity >= 0),
        category    TEXT    NOT NULL,
        created_at  TEXT    NOT NULL,
        updated_at  TEXT    NOT NULL,
        deleted_at  TEXT    NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products (category)",
    "CREATE INDEX IF NOT EXISTS idx_products_deleted_at ON products (deleted_at)",
];

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        name,
        description,
        price,
        quantity,
        category,
        created_at,
        updated_at,
        deleted_at
    FROM products
"#;

/// Durable product store on top of a SQLite connection pool.
///
/// The pool is injected (or opened from a `StoreConfig`) at startup and
/// closed explicitly with `close()` at shutdown.
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
    missing_id: MissingIdPolicy,
}

impl SqliteProductStore {
    /// Open (creating if missing) the database described by `config` and
    /// bootstrap the schema.
    #[instrument(skip(config), fields(database_url = %config.database_url), err)]
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| map_sqlx_error("connect", e))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Self::from_pool(pool, config.missing_id).await
    }

    /// Wrap an existing pool and bootstrap the schema.
    pub async fn from_pool(pool: SqlitePool, missing_id: MissingIdPolicy) -> Result<Self, StoreError> {
        let store = Self { pool, missing_id };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the `products` table and its indexes if they do not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        tracing::debug!("products schema ready");
        Ok(())
    }

    pub fn missing_id_policy(&self) -> MissingIdPolicy {
        self.missing_id
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for in-flight operations to finish.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("product store closed");
    }

    async fn select_where(
        &self,
        operation: &'static str,
        predicate: &str,
        category: Option<&str>,
    ) -> Result<Vec<Product>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE {predicate} ORDER BY id ASC");
        let mut query = sqlx::query_as::<_, ProductRow>(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        let products = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Span::current().record("count", products.len());
        Ok(products)
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    #[instrument(skip(self, details), fields(category = %details.category), err)]
    async fn create(&self, details: ProductDetails) -> Result<ProductId, StoreError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name,
                description,
                price,
                quantity,
                category,
                created_at,
                updated_at,
                deleted_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, NULL)
            "#,
        )
        .bind(&details.name)
        .bind(details.description.as_deref())
        .bind(details.price)
        .bind(quantity_column("create", details.quantity)?)
        .bind(&details.category)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        let id = ProductId::try_from(result.last_insert_rowid())?;
        tracing::info!(product_id = %id, "product created");
        Ok(id)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let Some(key) = row_key(id) else {
            return Ok(None);
        };
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.map(Product::try_from).transpose()
    }

    #[instrument(skip(self), fields(count = tracing::field::Empty), err)]
    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        self.select_where("list_active", "deleted_at IS NULL", None).await
    }

    #[instrument(skip(self), fields(count = tracing::field::Empty), err)]
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        self.select_where("list_by_category", "category = ?1", Some(category))
            .await
    }

    #[instrument(skip(self), fields(count = tracing::field::Empty), err)]
    async fn list_deleted(&self) -> Result<Vec<Product>, StoreError> {
        self.select_where("list_deleted", "deleted_at IS NOT NULL", None)
            .await
    }

    #[instrument(skip(self, details), fields(product_id = %id), err)]
    async fn update(&self, id: ProductId, details: ProductDetails) -> Result<(), StoreError> {
        let key = row_key(id).ok_or(StoreError::NotFound(id))?;
        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                name = ?1,
                description = ?2,
                price = ?3,
                quantity = ?4,
                category = ?5,
                updated_at = ?6
            WHERE id = ?7
            "#,
        )
        .bind(&details.name)
        .bind(details.description.as_deref())
        .bind(details.price)
        .bind(quantity_column("update", details.quantity)?)
        .bind(&details.category)
        .bind(Utc::now())
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn soft_delete(&self, id: ProductId) -> Result<(), StoreError> {
        let Some(key) = row_key(id) else {
            return self.missing_id.check(id, 0);
        };
        let result = sqlx::query("UPDATE products SET deleted_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("soft_delete", e))?;

        if result.rows_affected() == 0 {
            tracing::debug!("soft_delete matched no product");
        }
        self.missing_id.check(id, result.rows_affected())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn restore(&self, id: ProductId) -> Result<(), StoreError> {
        let Some(key) = row_key(id) else {
            return self.missing_id.check(id, 0);
        };
        let result = sqlx::query("UPDATE products SET deleted_at = NULL WHERE id = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("restore", e))?;

        if result.rows_affected() == 0 {
            tracing::debug!("restore matched no product");
        }
        self.missing_id.check(id, result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<ProductCounts, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN deleted_at IS NULL THEN 1 ELSE 0 END), 0) AS active,
                COALESCE(SUM(CASE WHEN deleted_at IS NOT NULL THEN 1 ELSE 0 END), 0) AS deleted
            FROM products
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("count", e))?;

        let active: i64 = row.try_get("active").map_err(|e| map_sqlx_error("count", e))?;
        let deleted: i64 = row.try_get("deleted").map_err(|e| map_sqlx_error("count", e))?;

        Ok(ProductCounts {
            active: non_negative_count("active", active)?,
            deleted: non_negative_count("deleted", deleted)?,
        })
    }
}

/// Raw `products` row as stored.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    quantity: i64,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = ProductId::try_from(row.id)?;
        let quantity = u64::try_from(row.quantity).map_err(|_| {
            StoreError::persistence(format!(
                "product {id} has out-of-range quantity {}",
                row.quantity
            ))
        })?;

        Ok(Product::rehydrate(
            id,
            ProductDetails {
                name: row.name,
                description: row.description,
                price: row.price,
                quantity,
                category: row.category,
            },
            row.created_at,
            row.updated_at,
            row.deleted_at,
        ))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::persistence(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::persistence(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::persistence(format!("timed out waiting for a connection in {}", operation))
        }
        _ => StoreError::persistence(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Row key for `id`. Ids beyond `i64::MAX` can never be stored, so `None`
/// means "no such row".
fn row_key(id: ProductId) -> Option<i64> {
    i64::try_from(id).ok()
}

fn quantity_column(operation: &str, quantity: u64) -> Result<i64, StoreError> {
    i64::try_from(quantity).map_err(|_| {
        StoreError::persistence(format!(
            "quantity {quantity} does not fit the quantity column in {operation}"
        ))
    })
}

fn non_negative_count(label: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value)
        .map_err(|_| StoreError::persistence(format!("count returned negative {label} total {value}")))
}
