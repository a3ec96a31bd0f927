use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{Result, ScrapeError};
use super::traits::DocumentFetcher;
use super::types::ScrapeConfig;

/// Blocking HTTP fetcher for feed documents and detail pages
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| ScrapeError::Fetch {
                url: String::new(),
                source,
            })?;

        Ok(Self::with_client(client))
    }

    /// Fetch through an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| ScrapeError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status: {}", url, status);
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;

        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
