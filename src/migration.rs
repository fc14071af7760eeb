//! Schema setup for the `products` table. Idempotent; run at startup.

use crate::error::StoreError;
use sqlx::PgPool;

pub const PRODUCTS_TABLE: &str = "products";

/// Create the products table if it does not exist.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), StoreError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL CHECK (btrim(name) <> ''),
            description TEXT NOT NULL DEFAULT '',
            price NUMERIC NOT NULL CHECK (price >= 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        PRODUCTS_TABLE
    );
    sqlx::query(&ddl).execute(pool).await?;
    tracing::info!(table = PRODUCTS_TABLE, "schema ready");
    Ok(())
}
