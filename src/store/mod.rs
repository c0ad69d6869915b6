//! Item persistence behind one async interface with two backends.

use crate::error::AppError;
use crate::model::{Item, ItemCreate, ItemUpdate};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryItemStore;
pub use postgres::PgItemStore;

/// One page of a listing plus the count of all matching items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub items: Vec<Item>,
    pub total: u64,
}

/// Storage for items. Listings are ordered newest first (`created_at`
/// descending, ties broken by insertion order).
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Short label for logs and readiness output.
    fn backend(&self) -> &'static str;

    async fn create(&self, input: ItemCreate) -> Result<Item, AppError>;

    /// `Ok(None)` when no item has this id.
    async fn get(&self, id: Uuid) -> Result<Option<Item>, AppError>;

    async fn list(&self, skip: u64, limit: u64) -> Result<Listing, AppError>;

    /// Apply a non-empty partial update. `Ok(None)` when no item has this id.
    async fn update(&self, id: Uuid, update: ItemUpdate) -> Result<Option<Item>, AppError>;

    /// Returns `false` when no item had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Case-insensitive substring match on `name`.
    async fn search(&self, query: &str, skip: u64, limit: u64) -> Result<Listing, AppError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Release backend resources at shutdown.
    async fn close(&self) {}
}
