//! Storage collaborator: the `ProductStore` seam plus its PostgreSQL and
//! in-memory implementations.

mod memory;
mod postgres;

pub use memory::MemoryProductStore;
pub use postgres::{ensure_database_exists, PgProductStore};

use crate::error::StoreError;
use crate::product::{NewProduct, Product, ProductChanges};
use async_trait::async_trait;

/// Persistence for products. Every mutating call runs in its own transaction
/// that is committed on success and rolled back before an error is returned.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by id.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Insert and return the stored row with its assigned id and timestamps.
    async fn insert(&self, new: &NewProduct) -> Result<Product, StoreError>;

    /// Apply `changes` and refresh `updated_at`. `None` when no row has `id`.
    async fn update(&self, id: i64, changes: &ProductChanges) -> Result<Option<Product>, StoreError>;

    /// Hard delete. `false` when no row has `id`.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
