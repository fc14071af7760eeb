//! product-api: product catalog CRUD service over HTTP.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod product;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError, StoreError};
pub use migration::apply_migrations;
pub use product::{NewProduct, Product, ProductChanges};
pub use routes::{app_router, common_routes, product_routes};
pub use service::ProductService;
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryProductStore, PgProductStore, ProductStore};
