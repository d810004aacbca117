//! API routes module.

pub mod handlers;
pub mod routes;

pub use routes::{cors_layer, create_router};
