use crate::book_workflow::BookWorkflow;
use crate::error::AppResult;
use crate::models::{ChatRequest, ChatResponse, HealthResponse};
use axum::{
    extract::{Json, State, rejection::JsonRejection},
    response::{Html, Json as ResponseJson},
};
use tracing::{debug, info};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Serves the chat page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> ResponseJson<HealthResponse> {
    debug!("Health check endpoint called");
    ResponseJson(HealthResponse::ok())
}

/// Chat handler: asks the model for a book and looks it up in the catalog.
/// Any well-formed JSON body gets a 200; an absent message is sent as an empty prompt.
pub async fn chat_handler(
    State(workflow): State<BookWorkflow>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<ResponseJson<ChatResponse>> {
    let Json(body) = payload?;
    let payload = ChatRequest::from(body);
    info!("Chat endpoint called with message: {:?}", payload.message);

    let response = workflow.run(payload.prompt()).await;

    info!("Returning chat response with {} book(s)", response.books.len());
    Ok(ResponseJson(response))
}
