//! APIs for getting information about the application.

use crate::infra::{
    config::{Config, StorageBackend},
    extract::Json,
    state::AppState,
};
use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// The info API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new().route("/info", get(info))
}

/// Application information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppInfo {
    /// The application name.
    #[schema(example = "item-catalog")]
    name: String,
    /// The application version.
    #[schema(example = "0.1.0")]
    version: String,
    /// Where items are kept, `postgres` or `memory`.
    #[schema(example = "postgres")]
    storage: String,
}

/// Returns application information.
#[utoipa::path(
    get,
    path = "/api/info",
    responses(
        (status = 200, description = "Success", body = AppInfo),
    )
)]
pub async fn info(State(config): State<Arc<Config>>) -> Json<AppInfo> {
    let storage = match config.database.backend {
        StorageBackend::Postgres => "postgres",
        StorageBackend::Memory => "memory",
    };
    Json(AppInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.to_string(),
    })
}
