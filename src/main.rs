mod auth;
mod config;
mod db;
mod handlers;
mod models;
mod session;

use anyhow::{Context, Result};
use config::Config;
use db::{QueryExecutor, ShowStore, StoreSettings};
use session::SessionStore;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub struct AppState {
    pub db_pool: PgPool,
    pub sessions: SessionStore,
    pub store_settings: StoreSettings,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "horseshows=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Set up database
    tracing::info!(
        max_connections = config.max_connections,
        "Connecting to database"
    );
    let db_pool = db::create_pool(&config.database_url, config.max_connections, config.acquire_timeout)
        .await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .context("Failed to run migrations")?;

    seed_admin(&db_pool, &config).await?;

    // Create shared application state
    let state = Arc::new(AppState {
        db_pool,
        sessions: SessionStore::new(),
        store_settings: config.store_settings(),
    });

    let app = handlers::router(state);

    // Start server
    let addr = config.bind_addr();
    tracing::info!(
        "Starting server on {} (class delete policy: {:?})",
        addr,
        config.class_delete_policy
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the `admin` account from ADMIN_PASSWORD if it doesn't exist yet
async fn seed_admin(pool: &PgPool, config: &Config) -> Result<()> {
    let Some(password) = config.admin_password.as_deref() else {
        tracing::warn!("No ADMIN_PASSWORD configured; admin account not seeded");
        return Ok(());
    };

    let store = ShowStore::new(
        QueryExecutor::new(pool.clone()),
        None,
        config.store_settings(),
    );
    if store.exists_email_address(auth::ADMIN_USERNAME).await? {
        tracing::info!("Admin account already present");
        return Ok(());
    }

    match store.create_account(auth::ADMIN_USERNAME, password).await {
        Ok(_) => tracing::info!("Created admin account"),
        // Another instance seeded it first
        Err(db::StoreError::AccountExists { .. }) => {}
        Err(e) => return Err(e).context("Failed to seed admin account"),
    }
    Ok(())
}
