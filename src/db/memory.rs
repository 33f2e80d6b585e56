//! In-memory `StoreClient` used by unit tests.
//!
//! Each transaction works on a private copy of the table that replaces the shared copy on commit.
//! Conflicts can be injected either at the first statement of a transaction or at commit.
//! Commits can be slowed down after they have applied, and the store can be closed.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::db::models::InventoryItem;
use crate::db::traits::{StoreClient, StoreTx};
use crate::error::InventoryError;

type Table = BTreeMap<i64, InventoryItem>;

#[derive(Debug, Default)]
struct Counters {
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    // `None` until the table is created.
    shared: Arc<Mutex<Option<Table>>>,
    counters: Arc<Counters>,
    statement_conflicts: Arc<AtomicUsize>,
    commit_conflicts: Arc<AtomicUsize>,
    commit_delay: Arc<Mutex<Duration>>,
    closed: Arc<AtomicBool>,
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn conflict() -> InventoryError {
    InventoryError::SerializationConflict("injected: restart transaction".to_string())
}

impl MemoryStore {
    pub(crate) fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let store = Self::default();
        let table = items.into_iter().map(|item| (item.id, item)).collect();
        *store.shared.lock().unwrap() = Some(table);
        store
    }

    /// The next `n` transactions fail their first statement with a conflict.
    pub(crate) fn fail_statements(&self, n: usize) {
        self.statement_conflicts.store(n, Ordering::SeqCst);
    }

    /// The next `n` commits fail with a conflict.
    pub(crate) fn fail_commits(&self, n: usize) {
        self.commit_conflicts.store(n, Ordering::SeqCst);
    }

    /// Every commit applies its changes, then waits `delay` before returning.
    pub(crate) fn slow_commits(&self, delay: Duration) {
        *self.commit_delay.lock().unwrap() = delay;
    }

    /// `begin` fails from now on, like a pool that has been shut down.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn begins(&self) -> usize {
        self.counters.begins.load(Ordering::SeqCst)
    }

    pub(crate) fn commits(&self) -> usize {
        self.counters.commits.load(Ordering::SeqCst)
    }

    pub(crate) fn rollbacks(&self) -> usize {
        self.counters.rollbacks.load(Ordering::SeqCst)
    }

    pub(crate) fn items(&self) -> Option<Vec<InventoryItem>> {
        self.shared
            .lock()
            .unwrap()
            .as_ref()
            .map(|table| table.values().cloned().collect())
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, InventoryError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(InventoryError::Database(sqlx::Error::PoolClosed));
        }
        self.counters.begins.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTx {
            working: self.shared.lock().unwrap().clone(),
            conflict_pending: take_one(&self.statement_conflicts),
            store: self.clone(),
        })
    }
}

pub(crate) struct MemoryTx {
    store: MemoryStore,
    working: Option<Table>,
    conflict_pending: bool,
}

impl MemoryTx {
    fn table(&mut self) -> Result<&mut Table, InventoryError> {
        if std::mem::take(&mut self.conflict_pending) {
            return Err(conflict());
        }
        self.working.as_mut().ok_or_else(|| {
            InventoryError::Database(sqlx::Error::Configuration(
                "relation \"store\" does not exist".into(),
            ))
        })
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn create_table(&mut self) -> Result<(), InventoryError> {
        if std::mem::take(&mut self.conflict_pending) {
            return Err(conflict());
        }
        self.working.get_or_insert_with(Table::new);
        Ok(())
    }

    async fn upsert_item(&mut self, item: &InventoryItem) -> Result<u64, InventoryError> {
        self.table()?.insert(item.id, item.clone());
        Ok(1)
    }

    async fn insert_item(&mut self, item: &InventoryItem) -> Result<u64, InventoryError> {
        let table = self.table()?;
        if table.contains_key(&item.id) {
            return Err(InventoryError::DuplicateKey(item.id));
        }
        table.insert(item.id, item.clone());
        Ok(1)
    }

    async fn fetch_quantity(&mut self, id: i64) -> Result<Option<i64>, InventoryError> {
        Ok(self.table()?.get(&id).map(|item| item.quantity))
    }

    async fn decrement_quantity(&mut self, id: i64, by: i64) -> Result<u64, InventoryError> {
        match self.table()?.get_mut(&id) {
            Some(item) => {
                item.quantity -= by;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_item(&mut self, id: i64) -> Result<u64, InventoryError> {
        Ok(u64::from(self.table()?.remove(&id).is_some()))
    }

    async fn fetch_all(&mut self) -> Result<Vec<InventoryItem>, InventoryError> {
        Ok(self.table()?.values().cloned().collect())
    }

    async fn commit(self) -> Result<(), InventoryError> {
        self.store.counters.commits.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.store.commit_conflicts) {
            return Err(conflict());
        }
        *self.store.shared.lock().unwrap() = self.working;
        let delay = *self.store.commit_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), InventoryError> {
        self.store.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
