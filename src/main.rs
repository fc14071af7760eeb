//! product-api server: loads settings from the environment, prepares storage,
//! and serves the product routes until Ctrl-C or SIGTERM.

use product_api::{
    app_router, apply_migrations, ensure_database_exists, AppState, MemoryProductStore, PgProductStore, ProductStore,
    Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("product_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let store = build_store(&settings).await?;
    let app = app_router(AppState::new(store), &settings);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

async fn build_store(settings: &Settings) -> Result<Arc<dyn ProductStore>, Box<dyn std::error::Error>> {
    let Some(database_url) = settings.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; products are kept in memory and lost on exit");
        return Ok(Arc::new(MemoryProductStore::new()));
    };
    ensure_database_exists(database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(database_url)
        .await?;
    apply_migrations(&pool).await?;
    Ok(Arc::new(PgProductStore::new(pool)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
