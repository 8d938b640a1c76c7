//! The application's features, one module per resource.

pub mod info;
pub mod item;
