use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for the chat endpoint
#[derive(Debug, Default)]
pub struct ChatRequest {
    pub message: Option<String>,
}

impl ChatRequest {
    /// The text forwarded to the model; an absent message becomes an empty prompt
    pub fn prompt(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// Any well-formed JSON body is accepted. A string `message` is used as-is,
/// other JSON values are forwarded as their JSON text, and a missing or
/// null `message` (or a body that is not an object) means no message.
impl From<Value> for ChatRequest {
    fn from(body: Value) -> Self {
        let message = match body.get("message") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self { message }
    }
}

/// A single catalog hit, shaped for the chat page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub price: Option<serde_json::Value>,
    pub url: Option<String>,
}

/// Response payload for the chat endpoint
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub books: Vec<BookRecord>,
}

impl ChatResponse {
    pub fn new(response: String, books: Vec<BookRecord>) -> Self {
        Self { response, books }
    }
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}
