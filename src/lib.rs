pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

pub mod book_workflow;
// Re-export key functions for convenience
pub use app::{build_router, create_app, init_tracing};
