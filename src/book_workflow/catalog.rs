use std::time::Duration;

use anyhow::Context;
use tracing::{debug, error, info};

use super::CatalogSearchResponse;
use crate::config::Config;
use crate::models::BookRecord;

/// Genre code covering every book category
const ALL_GENRES: &str = "000";
/// Only the first hit is ever shown
const HITS: &str = "1";

/// Spaces become a literal `%20`; nothing else is escaped.
pub fn encode_keyword(title: &str) -> String {
    title.replace(' ', "%20")
}

/// Client for the book catalog search API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, app_id: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build catalog HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            app_id: app_id.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            &config.rakuten_api_url,
            &config.rakuten_app_id,
            config.outbound_timeout,
        )
    }

    /// Looks up a title and returns at most one book.
    /// An absent or empty title skips the request entirely; failures yield no books.
    pub async fn search(&self, title: Option<&str>) -> Vec<BookRecord> {
        let Some(title) = title.filter(|t| !t.is_empty()) else {
            debug!("No title guess, skipping catalog lookup");
            return Vec::new();
        };

        info!("Fetching books from catalog with title: {}", title);

        match self.fetch(&encode_keyword(title)).await {
            Ok(response) => response.into_books(),
            Err(e) => {
                error!("Error fetching data from catalog API: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn fetch(&self, keyword: &str) -> anyhow::Result<CatalogSearchResponse> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("applicationId", self.app_id.as_str()),
                ("format", "json"),
                ("keyword", keyword),
                ("booksGenreId", ALL_GENRES),
                ("hits", HITS),
            ])
            .send()
            .await
            .context("catalog request failed")?;

        info!("Received catalog response status: {}", response.status());

        let response = response
            .error_for_status()
            .context("catalog API returned an error status")?;

        let body = response
            .text()
            .await
            .context("failed to read catalog response body")?;
        debug!("Catalog response body: {}", body);

        let search_response: CatalogSearchResponse =
            serde_json::from_str(&body).context("failed to decode catalog response")?;
        Ok(search_response)
    }
}
