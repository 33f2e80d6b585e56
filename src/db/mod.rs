//! Database module: the `store` table and the transactional client over it.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL shared by every backend
//! - `traits.rs`: the `StoreClient`/`StoreTx` seam the retry executor drives
//! - `sql_store.rs`: sqlx-backed implementation (PostgreSQL wire, SQLite)

pub mod models;
pub mod schema;
pub mod sql_store;
pub mod traits;

#[cfg(test)]
pub(crate) mod memory;

pub use models::InventoryItem;
pub use sql_store::{Backend, SqlStore, SqlTx};
pub use traits::{StoreClient, StoreTx};
