//! In-memory product store for tests and database-less development.

use super::ProductStore;
use crate::error::StoreError;
use crate::product::{NewProduct, Product, ProductChanges};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Rows {
    last_id: i64,
    by_id: BTreeMap<i64, Product>,
}

/// Ids are assigned from a counter and never reused, even after deletes.
#[derive(Default)]
pub struct MemoryProductStore {
    rows: RwLock<Rows>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Rows>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::Backend("product store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Rows>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::Backend("product store lock poisoned".into()))
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.by_id.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    async fn insert(&self, new: &NewProduct) -> Result<Product, StoreError> {
        let mut rows = self.write()?;
        rows.last_id += 1;
        let now = Utc::now();
        let product = Product {
            id: rows.last_id,
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            created_at: Some(now),
            updated_at: Some(now),
        };
        rows.by_id.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, changes: &ProductChanges) -> Result<Option<Product>, StoreError> {
        let mut rows = self.write()?;
        Ok(rows.by_id.get_mut(&id).map(|product| {
            changes.apply_to(product, Utc::now());
            product.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.write()?.by_id.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}
