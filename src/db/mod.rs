pub mod account;
pub mod class;
pub mod entry;
pub mod executor;
pub mod store;

pub use executor::QueryExecutor;
pub use store::{ClassDeletePolicy, ShowStore, StoreSettings};

use crate::auth::AuthError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Errors surfaced by the persistence facade
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("an account for '{email}' already exists")]
    AccountExists { email: String },

    #[error("class {class_id} still has {entries} entries")]
    ClassHasEntries { class_id: i32, entries: i64 },
}

pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
}
