use async_trait::async_trait;

use crate::db::models::InventoryItem;
use crate::error::InventoryError;

/// Something that can open serializable transactions against the `store` table.
#[async_trait]
pub trait StoreClient: Send + Sync {
    type Tx: StoreTx;

    async fn begin(&self) -> Result<Self::Tx, InventoryError>;
}

/// An open transaction. Errors come back already classified, so a conflict is always
/// `InventoryError::SerializationConflict` regardless of backend.
///
/// Dropping a transaction without calling `commit` or `rollback` must discard its effects.
#[async_trait]
pub trait StoreTx: Send {
    async fn create_table(&mut self) -> Result<(), InventoryError>;

    /// Insert or overwrite the row keyed by `item.id`.
    async fn upsert_item(&mut self, item: &InventoryItem) -> Result<u64, InventoryError>;

    /// Insert a new row; an existing id yields `DuplicateKey`.
    async fn insert_item(&mut self, item: &InventoryItem) -> Result<u64, InventoryError>;

    async fn fetch_quantity(&mut self, id: i64) -> Result<Option<i64>, InventoryError>;

    /// Returns the number of rows touched (0 when the id is absent).
    async fn decrement_quantity(&mut self, id: i64, by: i64) -> Result<u64, InventoryError>;

    async fn delete_item(&mut self, id: i64) -> Result<u64, InventoryError>;

    async fn fetch_all(&mut self) -> Result<Vec<InventoryItem>, InventoryError>;

    async fn commit(self) -> Result<(), InventoryError>;

    async fn rollback(self) -> Result<(), InventoryError>;
}
