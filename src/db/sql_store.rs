//! `StoreClient` over the sqlx Any driver.
//!
//! This sits in the `db` module because it contains SQL/table knowledge. One implementation serves
//! PostgreSQL-wire stores (PostgreSQL, CockroachDB) and SQLite; the backend is picked from the URL
//! scheme.

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{Any, AnyPool, Transaction};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::BasicConfig;
use crate::db::models::InventoryItem;
use crate::db::schema::{
    CREATE_STORE, DECREMENT_QUANTITY, DELETE_ITEM, INSERT_ITEM, SELECT_ALL, SELECT_QUANTITY,
    SET_SERIALIZABLE, UPSERT_ITEM,
};
use crate::db::traits::{StoreClient, StoreTx};
use crate::error::{ErrorClass, InventoryError, classify};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL wire protocol (PostgreSQL, CockroachDB).
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(database_url: &str) -> Result<Self, InventoryError> {
        let url = Url::parse(database_url)
            .map_err(|e| InventoryError::UnsupportedDatabase(format!("invalid url: {e}")))?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(InventoryError::UnsupportedDatabase(format!(
                "unsupported scheme `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: AnyPool,
    backend: Backend,
}

impl SqlStore {
    pub async fn connect(cfg: &BasicConfig) -> Result<Self, InventoryError> {
        let backend = Backend::from_url(&cfg.database_url)?;
        install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect(&cfg.database_url)
            .await
            .map_err(InventoryError::Database)?;

        info!(
            ?backend,
            max_connections = cfg.max_connections,
            "Store connection pool ready"
        );
        Ok(Self { pool, backend })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl StoreClient for SqlStore {
    type Tx = SqlTx;

    async fn begin(&self) -> Result<SqlTx, InventoryError> {
        let mut inner = self.pool.begin().await?;
        if self.backend == Backend::Postgres {
            sqlx::query(SET_SERIALIZABLE).execute(&mut *inner).await?;
        }
        Ok(SqlTx { inner })
    }
}

/// Rolls back on drop unless committed.
pub struct SqlTx {
    inner: Transaction<'static, Any>,
}

#[async_trait]
impl StoreTx for SqlTx {
    async fn create_table(&mut self) -> Result<(), InventoryError> {
        sqlx::query(CREATE_STORE).execute(&mut *self.inner).await?;
        debug!(table = "store", "db table ensured");
        Ok(())
    }

    async fn upsert_item(&mut self, item: &InventoryItem) -> Result<u64, InventoryError> {
        let res = sqlx::query(UPSERT_ITEM)
            .bind(item.id)
            .bind(item.quantity)
            .bind(item.name.clone())
            .execute(&mut *self.inner)
            .await?;

        let affected = res.rows_affected();
        debug!(id = item.id, affected, "db upsert applied");
        Ok(affected)
    }

    async fn insert_item(&mut self, item: &InventoryItem) -> Result<u64, InventoryError> {
        let res = sqlx::query(INSERT_ITEM)
            .bind(item.id)
            .bind(item.quantity)
            .bind(item.name.clone())
            .execute(&mut *self.inner)
            .await
            .map_err(|e| match classify(&e) {
                ErrorClass::ConstraintViolation => InventoryError::DuplicateKey(item.id),
                _ => InventoryError::from(e),
            })?;

        let affected = res.rows_affected();
        debug!(id = item.id, affected, "db insert applied");
        Ok(affected)
    }

    async fn fetch_quantity(&mut self, id: i64) -> Result<Option<i64>, InventoryError> {
        let quantity: Option<i64> = sqlx::query_scalar(SELECT_QUANTITY)
            .bind(id)
            .fetch_optional(&mut *self.inner)
            .await?;

        debug!(id, ?quantity, "db quantity read");
        Ok(quantity)
    }

    async fn decrement_quantity(&mut self, id: i64, by: i64) -> Result<u64, InventoryError> {
        let res = sqlx::query(DECREMENT_QUANTITY)
            .bind(by)
            .bind(id)
            .execute(&mut *self.inner)
            .await?;

        let affected = res.rows_affected();
        debug!(id, by, affected, "db decrement applied");
        Ok(affected)
    }

    async fn delete_item(&mut self, id: i64) -> Result<u64, InventoryError> {
        let res = sqlx::query(DELETE_ITEM)
            .bind(id)
            .execute(&mut *self.inner)
            .await?;

        let affected = res.rows_affected();
        debug!(id, affected, "db delete applied");
        Ok(affected)
    }

    async fn fetch_all(&mut self) -> Result<Vec<InventoryItem>, InventoryError> {
        let rows = sqlx::query_as::<_, InventoryItem>(SELECT_ALL)
            .fetch_all(&mut *self.inner)
            .await?;

        debug!(rows = rows.len(), "db listing read");
        Ok(rows)
    }

    async fn commit(self) -> Result<(), InventoryError> {
        self.inner.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), InventoryError> {
        self.inner.rollback().await?;
        Ok(())
    }
}
