//! Product lifecycle on top of an injected store.

use crate::error::{AppError, StoreError};
use crate::product::Product;
use crate::service::ProductValidator;
use crate::store::ProductStore;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        self.store.list().await.map_err(storage_failure("list"))
    }

    pub async fn get(&self, id: i64) -> Result<Product, AppError> {
        self.store
            .get(id)
            .await
            .map_err(storage_failure("get"))?
            .ok_or_else(|| AppError::product_not_found(id))
    }

    /// Validate and insert. Nothing is written when validation fails.
    pub async fn create(&self, body: Option<Value>) -> Result<Product, AppError> {
        let new = ProductValidator::validate_create(body).inspect_err(rejected)?;
        let product = self.store.insert(&new).await.map_err(storage_failure("create"))?;
        tracing::info!(id = product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// Existence is checked before the body, so an unknown id is a 404 whatever
    /// the payload. A body naming no known field leaves the row (and
    /// `updated_at`) untouched.
    pub async fn update(&self, id: i64, body: Option<Value>) -> Result<Product, AppError> {
        let current = self.get(id).await?;
        let changes = ProductValidator::validate_update(body).inspect_err(rejected)?;
        if changes.is_empty() {
            return Ok(current);
        }
        let product = self
            .store
            .update(id, &changes)
            .await
            .map_err(storage_failure("update"))?
            .ok_or_else(|| AppError::product_not_found(id))?;
        tracing::info!(id, "product updated");
        Ok(product)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let removed = self.store.delete(id).await.map_err(storage_failure("delete"))?;
        if !removed {
            return Err(AppError::product_not_found(id));
        }
        tracing::info!(id, "product deleted");
        Ok(())
    }

    /// Storage readiness probe.
    pub async fn ready(&self) -> Result<(), AppError> {
        self.store.ping().await.map_err(AppError::from)
    }
}

fn rejected(err: &AppError) {
    tracing::warn!(error = %err, "request rejected");
}

fn storage_failure(operation: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| {
        tracing::error!(operation, error = %err, "storage failure");
        AppError::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryProductStore;
    use serde_json::json;

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryProductStore::new()))
    }

    #[tokio::test]
    async fn rejected_create_persists_nothing() {
        let svc = service();
        let err = svc.create(Some(json!({"name": "Mug", "price": -1}))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found_even_with_bad_body() {
        let svc = service();
        let err = svc.update(99, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_with_only_unknown_keys_changes_nothing() {
        let svc = service();
        let created = svc.create(Some(json!({"name": "Mug", "price": 4}))).await.unwrap();
        let same = svc.update(created.id, Some(json!({"colour": "red"}))).await.unwrap();
        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let svc = service();
        let created = svc.create(Some(json!({"name": "Mug", "price": 4}))).await.unwrap();
        svc.delete(created.id).await.unwrap();
        assert!(matches!(svc.delete(created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.get(created.id).await, Err(AppError::NotFound(_))));
    }
}
