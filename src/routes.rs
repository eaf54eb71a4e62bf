use crate::book_workflow::BookWorkflow;
use crate::handlers::{chat_handler, health_check, index};
use axum::{Router, routing::get, routing::post};
use tower_http::services::ServeDir;

/// Creates and configures all application routes
pub fn create_routes(static_dir: &str) -> Router<BookWorkflow> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_handler))
        .nest_service("/static", ServeDir::new(static_dir))
}
