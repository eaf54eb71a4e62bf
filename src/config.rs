use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, anyhow};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CATALOG_URL: &str =
    "https://app.rakuten.co.jp/services/api/BooksTotal/Search/20170404";

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub rakuten_app_id: String,
    pub rakuten_api_url: String,
    pub outbound_timeout: Duration,
    pub static_dir: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Fails when a credential is missing so the server never binds without them.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| optional(key).ok_or_else(|| anyhow!("{} must be set", key));

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a valid number, got {:?}", raw))?,
            None => 8080,
        };

        let timeout_secs: u64 = match optional("OUTBOUND_TIMEOUT_SECS") {
            Some(raw) => raw.parse().with_context(|| {
                format!("OUTBOUND_TIMEOUT_SECS must be a whole number, got {:?}", raw)
            })?,
            None => 30,
        };

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: optional("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            rakuten_app_id: required("RAKUTEN_APP_ID")?,
            rakuten_api_url: optional("RAKUTEN_API_URL")
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            outbound_timeout: Duration::from_secs(timeout_secs),
            static_dir: optional("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

// Credentials stay out of the startup log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("openai_api_key", &"***")
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("rakuten_app_id", &"***")
            .field("rakuten_api_url", &self.rakuten_api_url)
            .field("outbound_timeout", &self.outbound_timeout)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}
