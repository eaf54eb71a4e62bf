use tracing::{error, info};

use super::llm::CompletionModel;

pub const SUGGESTION_LEAD_IN: &str = "Here's a suggestion: ";
pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't fetch a suggestion at the moment.";

/// What the model said, plus the title we think it named
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub display_text: String,
    pub title_guess: Option<String>,
}

impl Suggestion {
    pub fn from_reply(reply: &str) -> Self {
        let reply = reply.trim();
        Self {
            display_text: format!("{}{}", SUGGESTION_LEAD_IN, reply),
            title_guess: Some(extract_title_guess(reply)),
        }
    }

    pub fn fallback() -> Self {
        Self {
            display_text: FALLBACK_RESPONSE.to_string(),
            title_guess: None,
        }
    }
}

/// Naive title extraction from a free-text reply.
///
/// With at least two `"` characters the guess is whatever sits between the
/// first and the second one, even if that is empty. Anything else (no
/// quote, or a lone quote) makes the whole reply the guess. Text after the
/// second quote is ignored.
pub fn extract_title_guess(reply: &str) -> String {
    let mut parts = reply.splitn(3, '"').skip(1);
    match (parts.next(), parts.next()) {
        (Some(quoted), Some(_)) => quoted.to_string(),
        _ => reply.to_string(),
    }
}

/// Asks the model for a suggestion. Never fails: any model error turns
/// into the fixed apology with no title.
pub async fn suggest(model: &dyn CompletionModel, message: &str) -> Suggestion {
    match model.complete(message).await {
        Ok(reply) => {
            info!("Model suggestion: {}", reply.trim());
            Suggestion::from_reply(&reply)
        }
        Err(e) => {
            error!("Error interacting with completion API: {:#}", e);
            Suggestion::fallback()
        }
    }
}
