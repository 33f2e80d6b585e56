mod classify;
mod inventory;

pub use classify::{ErrorClass, classify};
pub use inventory::InventoryError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
