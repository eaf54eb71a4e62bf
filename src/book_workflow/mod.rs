pub mod catalog;
pub mod llm;
pub mod suggestion;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{BookRecord, ChatResponse};
use catalog::CatalogClient;
use llm::CompletionModel;
use suggestion::suggest;

/// The per-request pipeline: model suggestion, then catalog lookup.
/// Cloned into every handler call; holds no mutable state.
#[derive(Clone)]
pub struct BookWorkflow {
    llm: Arc<dyn CompletionModel>,
    catalog: CatalogClient,
}

impl BookWorkflow {
    pub fn new(llm: Arc<dyn CompletionModel>, catalog: CatalogClient) -> Self {
        Self { llm, catalog }
    }

    pub async fn run(&self, message: &str) -> ChatResponse {
        let suggestion = suggest(self.llm.as_ref(), message).await;
        info!("Title guess: {:?}", suggestion.title_guess);

        // The lookup needs the guess, so the two calls cannot overlap.
        let books = self.catalog.search(suggestion.title_guess.as_deref()).await;
        info!("Catalog returned {} book(s)", books.len());

        ChatResponse::new(suggestion.display_text, books)
    }
}

// -- data structures that capture the catalog search results

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogSearchResponse {
    #[serde(rename = "Items", default)]
    pub items: Option<Vec<CatalogEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogEntry {
    #[serde(rename = "Item", default)]
    pub item: CatalogItem,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "largeImageUrl", default)]
    pub large_image_url: Option<String>,
    #[serde(rename = "itemPrice", default)]
    pub item_price: Option<serde_json::Value>,
    #[serde(rename = "itemUrl", default)]
    pub item_url: Option<String>,
}

impl From<CatalogItem> for BookRecord {
    fn from(item: CatalogItem) -> Self {
        Self {
            title: item.title,
            author: item.author,
            image_url: item.large_image_url,
            price: item.item_price,
            url: item.item_url,
        }
    }
}

impl CatalogSearchResponse {
    /// Projects the first hit, if any, into the page's book shape
    pub fn into_books(self) -> Vec<BookRecord> {
        self.items
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|entry| vec![BookRecord::from(entry.item)])
            .unwrap_or_default()
    }
}
