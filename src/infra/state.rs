//! Global application state.
//!
//! Used for access to common resources such as the item store.

use super::config::Config;
use crate::feature::item::item_repository::ItemStore;
use axum::extract::FromRef;
use std::sync::Arc;

/// Global application state.
#[derive(Clone, FromRef)]
pub struct AppState {
    items: ItemStore,
    config: Arc<Config>,
}

impl AppState {
    /// Constructs a new [`AppState`].
    pub fn new(items: ItemStore, config: Config) -> Self {
        Self {
            items,
            config: Arc::new(config),
        }
    }

    /// Returns the application configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
