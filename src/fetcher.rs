use std::io::ErrorKind;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::error::{Result, SchemaError};

/// Settings for remote schema retrieval
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("json-schema-validator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Loads the raw text of a schema document.
#[cfg_attr(test, mockall::automock)]
pub trait SchemaFetcher: Send + Sync {
    fn fetch(&self, location: &Url) -> Result<String>;
}

/// Reads `file:` URLs from disk and `http(s):` URLs over the network.
///
/// The HTTP client is only built the first time a remote schema is needed.
/// Failures are returned immediately; there are no retries.
pub struct DefaultFetcher {
    config: FetchConfig,
    client: OnceLock<Client>,
}

impl DefaultFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    /// Get the fetcher configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn client(&self, location: &Url) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|source| SchemaError::Http {
                location: location.to_string(),
                source,
            })?;
        Ok(self.client.get_or_init(|| client))
    }

    fn fetch_file(&self, location: &Url) -> Result<String> {
        let path = location
            .to_file_path()
            .map_err(|_| SchemaError::SchemaNotFound {
                location: location.to_string(),
            })?;

        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => SchemaError::SchemaNotFound {
                location: location.to_string(),
            },
            _ => SchemaError::Io {
                location: location.to_string(),
                source,
            },
        })
    }

    fn fetch_http(&self, location: &Url) -> Result<String> {
        let http_error = |source| SchemaError::Http {
            location: location.to_string(),
            source,
        };

        let response = self
            .client(location)?
            .get(location.clone())
            .send()
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SchemaError::HttpStatus {
                location: location.to_string(),
                status: status.as_u16(),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        response.text().map_err(http_error)
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl SchemaFetcher for DefaultFetcher {
    fn fetch(&self, location: &Url) -> Result<String> {
        tracing::debug!(%location, "fetching schema");
        match location.scheme() {
            "file" => self.fetch_file(location),
            "http" | "https" => self.fetch_http(location),
            scheme => Err(SchemaError::UnsupportedScheme {
                location: location.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }
}
