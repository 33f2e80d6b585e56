pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod retry;
pub mod utils;

pub use db::{InventoryItem, SqlStore};
pub use error::InventoryError;
pub use inventory::Inventory;
pub use retry::RetryExecutor;
