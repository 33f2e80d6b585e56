//! The five inventory operations, each a unit of work for [`RetryExecutor`].
//!
//! None of these open or close transactions themselves. Every attempt re-reads what it needs,
//! so a retried purchase sees the balance left by whichever transaction beat it.

use tracing::info;

use crate::db::{InventoryItem, StoreClient, StoreTx};
use crate::error::InventoryError;
use crate::retry::RetryExecutor;

/// Inventory operations bound to one store client.
#[derive(Debug, Clone)]
pub struct Inventory<C> {
    client: C,
    executor: RetryExecutor,
}

impl<C: StoreClient> Inventory<C> {
    pub fn new(client: C, executor: RetryExecutor) -> Self {
        Self { client, executor }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Create the table if needed and (re)write the sentinel row. Safe on every start.
    pub async fn bootstrap(&self) -> Result<(), InventoryError> {
        self.executor
            .run("bootstrap", &self.client, |tx| {
                Box::pin(async move {
                    tx.create_table().await?;
                    tx.upsert_item(&InventoryItem::sentinel()).await?;
                    Ok(())
                })
            })
            .await?;

        info!("Inventory table ready");
        Ok(())
    }

    pub async fn insert(&self, id: i64, quantity: i64, name: &str) -> Result<(), InventoryError> {
        if quantity < 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        let item = InventoryItem::new(id, quantity, name);

        self.executor
            .run("insert", &self.client, move |tx| {
                let item = item.clone();
                Box::pin(async move {
                    tx.insert_item(&item).await?;
                    Ok(())
                })
            })
            .await?;

        info!(id, quantity, name, "Item added");
        Ok(())
    }

    /// Take `quantity` units of `id`; returns what is left.
    pub async fn purchase(&self, id: i64, quantity: i64) -> Result<i64, InventoryError> {
        if quantity < 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }

        let remaining = self
            .executor
            .run("purchase", &self.client, move |tx| {
                Box::pin(async move {
                    let available = tx
                        .fetch_quantity(id)
                        .await?
                        .ok_or(InventoryError::NotFound(id))?;

                    if available < quantity {
                        return Err(InventoryError::InsufficientQuantity {
                            id,
                            requested: quantity,
                            available,
                        });
                    }

                    if tx.decrement_quantity(id, quantity).await? == 0 {
                        return Err(InventoryError::NotFound(id));
                    }
                    Ok(available - quantity)
                })
            })
            .await?;

        info!(id, quantity, remaining, "Items bought");
        Ok(remaining)
    }

    /// Remove `id`. Removing an absent id succeeds; the flag says whether a row went away.
    pub async fn delete(&self, id: i64) -> Result<bool, InventoryError> {
        let affected = self
            .executor
            .run("delete", &self.client, move |tx| {
                Box::pin(async move { tx.delete_item(id).await })
            })
            .await?;

        info!(id, removed = affected > 0, "Item removed");
        Ok(affected > 0)
    }

    pub async fn list(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        self.executor
            .run("list", &self.client, |tx| Box::pin(async move { tx.fetch_all().await }))
            .await
    }
}
