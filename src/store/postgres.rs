//! PostgreSQL product store on a shared `sqlx` pool.

use super::ProductStore;
use crate::error::StoreError;
use crate::migration::PRODUCTS_TABLE;
use crate::product::{NewProduct, Product, ProductChanges};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool, Postgres, Transaction};
use std::str::FromStr;

const COLUMNS: &str = "id, name, description, price, created_at, updated_at";

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Commit on success. On failure roll back explicitly so the connection goes
/// back to the pool clean, then surface the original error.
async fn finish<T>(tx: Transaction<'_, Postgres>, result: Result<T, sqlx::Error>) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "rollback failed");
            }
            Err(e.into())
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", COLUMNS, PRODUCTS_TABLE);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, PRODUCTS_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, new: &NewProduct) -> Result<Product, StoreError> {
        let sql = format!(
            "INSERT INTO {} (name, description, price) VALUES ($1, $2, $3) RETURNING {}",
            PRODUCTS_TABLE, COLUMNS
        );
        tracing::debug!(sql = %sql, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, Product>(&sql)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.price)
            .fetch_one(&mut *tx)
            .await;
        finish(tx, result).await
    }

    async fn update(&self, id: i64, changes: &ProductChanges) -> Result<Option<Product>, StoreError> {
        let sql = format!(
            r#"
            UPDATE {} SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCTS_TABLE, COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.price)
            .fetch_optional(&mut *tx)
            .await;
        finish(tx, result).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", PRODUCTS_TABLE);
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map(|done| done.rows_affected() > 0);
        finish(tx, result).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database named in `database_url` exists, creating it through the
/// `postgres` maintenance database if needed. Call before building the pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = split_database_name(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn = opts.connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name.replace('"', "\"\"")))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split `postgres://host/name?opts` into (`postgres://host/postgres?opts`, `name`).
fn split_database_name(url: &str) -> Result<(String, String), StoreError> {
    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let slash = url[authority_start..]
        .find('/')
        .map(|i| i + authority_start)
        .ok_or_else(|| StoreError::Backend("DATABASE_URL has no database path".into()))?;
    let (path, query) = match url[slash + 1..].split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (&url[slash + 1..], None),
    };
    let mut admin_url = format!("{}/postgres", &url[..slash]);
    if let Some(q) = query {
        admin_url.push('?');
        admin_url.push_str(q);
    }
    Ok((admin_url, path.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, name) = split_database_name("postgres://u:p@localhost:5432/catalog").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "catalog");
    }

    #[test]
    fn keeps_query_on_admin_url() {
        let (admin, name) = split_database_name("postgres://localhost/catalog?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(name, "catalog");
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert!(split_database_name("postgres://localhost").is_err());
    }
    // The tests below need a reachable Postgres via DATABASE_URL; each gets a fresh database.

    async fn store(pool: PgPool) -> PgProductStore {
        crate::migration::apply_migrations(&pool).await.unwrap();
        PgProductStore::new(pool)
    }

    fn new_product(name: &str, price: &str) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[sqlx::test(migrations = false)]
    async fn insert_then_get_keeps_exact_price(pool: PgPool) {
        let store = store(pool).await;
        let created = store.insert(&new_product("Espresso cup", "12.345")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.price.to_string(), "12.345");
        assert_eq!(created.description, "");
        assert!(created.created_at.is_some());

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.price.to_string(), "12.345");
        assert!(store.get(created.id + 1000).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = false)]
    async fn description_only_update_keeps_other_fields(pool: PgPool) {
        let store = store(pool).await;
        let created = store.insert(&new_product("Kettle", "24.99")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let changes = ProductChanges {
            description: Some("1.7 litre".into()),
            ..Default::default()
        };
        let updated = store.update(created.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.description, "1.7 litre");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.price, created.price);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        assert!(store.update(created.id + 1000, &changes).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = false)]
    async fn second_delete_reports_missing(pool: PgPool) {
        let store = store(pool).await;
        let keep = store.insert(&new_product("Keep", "1")).await.unwrap();
        let gone = store.insert(&new_product("Gone", "1")).await.unwrap();

        assert!(store.delete(gone.id).await.unwrap());
        assert!(!store.delete(gone.id).await.unwrap());
        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![keep.id]);
    }

    #[sqlx::test(migrations = false)]
    async fn rejected_writes_roll_back(pool: PgPool) {
        let store = store(pool).await;
        let existing = store.insert(&new_product("Lamp", "19.99")).await.unwrap();

        let negative = store.insert(&new_product("Bad", "-1")).await;
        assert!(matches!(negative, Err(StoreError::Db(_))));
        let blank = store.insert(&new_product("   ", "1")).await;
        assert!(matches!(blank, Err(StoreError::Db(_))));

        let changes = ProductChanges {
            name: Some("Renamed".into()),
            price: Some(Decimal::from_str("-5").unwrap()),
            ..Default::default()
        };
        assert!(store.update(existing.id, &changes).await.is_err());

        let rows = store.list().await.unwrap();
        assert_eq!(rows, vec![existing]);
        store.ping().await.unwrap();
    }
}
