//! Shared application state for all routes.

use crate::service::ProductService;
use crate::store::ProductStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: ProductService,
}

impl AppState {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self {
            service: ProductService::new(store),
        }
    }
}
