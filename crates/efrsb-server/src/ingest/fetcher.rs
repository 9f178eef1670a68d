//! HTTP client for the paginated registry listing

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{RegistryHttpConfig, Result};

/// Failure fetching one listing page
///
/// Carries the page number so batch logging can attribute the skip.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request for page {page} failed: {source}")]
    Request {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("page {page} returned HTTP status {status}")]
    Status { page: u32, status: StatusCode },
}

impl FetchError {
    /// Page the failed request was for
    pub fn page(&self) -> u32 {
        match self {
            FetchError::Request { page, .. } | FetchError::Status { page, .. } => *page,
        }
    }
}

/// Fetches listing pages from the registry site
///
/// Stateless across calls apart from the shared `reqwest::Client`, which
/// reuses connections.
pub struct PageFetcher {
    client: Client,
    config: RegistryHttpConfig,
}

impl PageFetcher {
    /// Create a fetcher with the configured headers and timeout
    pub fn new(config: RegistryHttpConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        if let Ok(lang) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(PageFetcher { client, config })
    }

    /// Fetch one listing page, returning the raw markup
    ///
    /// `filters` are merged into the query string next to the page
    /// parameters. The site reads `PageID` or `page` depending on the view,
    /// so both are sent.
    pub async fn fetch(
        &self,
        page: u32,
        filters: &HashMap<String, String>,
    ) -> std::result::Result<String, FetchError> {
        let url = self.config.messages_url();

        let mut params: Vec<(String, String)> = vec![
            ("PageID".to_string(), page.to_string()),
            ("page".to_string(), page.to_string()),
        ];
        params.extend(filters.iter().map(|(k, v)| (k.clone(), v.clone())));

        debug!(page, url = %url, "fetching registry page");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|source| FetchError::Request { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { page, status });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::Request { page, source })
    }

    /// Get configuration
    pub fn config(&self) -> &RegistryHttpConfig {
        &self.config
    }
}
