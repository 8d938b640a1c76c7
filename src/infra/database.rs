//! For interacting with the database.

use super::{
    config::{DatabaseConfig, StorageBackend},
    error::InternalError,
};
use crate::feature::item::{
    item_repository::{ItemStore, PgItemRepository},
    memory_item_repository::InMemoryItemRepository,
};
use sqlx::{
    pool::PoolOptions,
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions, PgPool,
};
use std::{sync::Arc, time::Duration};
use tracing::log::LevelFilter;

/// A common database pool type.
pub type DbPool = PgPool;

/// Connects to the database based on some configuration.
pub fn init_db(config: &DatabaseConfig) -> DbPool {
    let db_options = PgConnectOptions::default()
        .username(&config.username)
        .password(&config.password)
        .host(&config.host)
        .port(config.port)
        .database(&config.database_name)
        .ssl_mode(PgSslMode::Prefer)
        .log_statements(LevelFilter::Debug);
    PoolOptions::default()
        .acquire_timeout(Duration::from_secs(5))
        .min_connections(1)
        .max_connections(config.max_connections)
        .connect_lazy_with(db_options)
}

/// Sets up the configured item store.
/// For PostgreSQL this also applies pending migrations.
pub async fn init_item_store(config: &DatabaseConfig) -> Result<ItemStore, InternalError> {
    match config.backend {
        StorageBackend::Postgres => {
            let db = init_db(config);
            sqlx::migrate!().run(&db).await?;
            tracing::info!("Using postgres item store at {}:{}", config.host, config.port);
            Ok(Arc::new(PgItemRepository::new(db)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory item store, items are lost on restart");
            Ok(Arc::new(InMemoryItemRepository::new()))
        }
    }
}
