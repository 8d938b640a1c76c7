//! A small CRUD service for items with search and pagination.

pub mod feature;
pub mod infra;
pub mod server;
