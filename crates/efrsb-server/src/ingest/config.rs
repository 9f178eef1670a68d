//! Registry endpoint configuration (EFRSB_* environment variables)

use serde::{Deserialize, Serialize};

use super::{IngestError, Result, DEFAULT_PAGE_COUNT};

/// Default registry host. The "old" host serves the server-rendered tables
/// this parser targets; the redesigned site is an SPA and out of scope.
pub const DEFAULT_BASE_URL: &str = "https://old.bankrot.fedresurs.ru";

/// Path of the paginated message listing.
pub const DEFAULT_MESSAGES_PATH: &str = "/Messages.aspx";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Browser-like User-Agent; the registry rejects obvious robot agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Accept-Language sent with every page request.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";

/// HTTP configuration for the registry fetcher and batch jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryHttpConfig {
    /// Scheme + host, no trailing slash; also the base for resolving
    /// relative details links.
    pub base_url: String,
    /// Listing path appended to `base_url`.
    pub messages_path: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    /// Webhook receiving freshly parsed batches; no webhook notifier when unset.
    pub notify_url: Option<String>,
    /// Pages a batch parse job walks by default.
    pub page_count: u32,
}

impl Default for RegistryHttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            messages_path: DEFAULT_MESSAGES_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            notify_url: None,
            page_count: DEFAULT_PAGE_COUNT,
        }
    }
}

impl RegistryHttpConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    ///
    /// Environment variables:
    /// - `EFRSB_BASE_URL`
    /// - `EFRSB_MESSAGES_PATH`
    /// - `EFRSB_TIMEOUT_SECS`
    /// - `EFRSB_USER_AGENT`
    /// - `EFRSB_NOTIFY_URL`
    /// - `EFRSB_PAGE_COUNT`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("EFRSB_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(path) = std::env::var("EFRSB_MESSAGES_PATH") {
            config.messages_path = path;
        }
        if let Ok(secs) = std::env::var("EFRSB_TIMEOUT_SECS") {
            config.timeout_secs = secs
                .parse()
                .map_err(|_| IngestError::Validation(format!("invalid EFRSB_TIMEOUT_SECS: {secs}")))?;
        }
        if let Ok(agent) = std::env::var("EFRSB_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(url) = std::env::var("EFRSB_NOTIFY_URL") {
            config.notify_url = Some(url);
        }
        if let Ok(count) = std::env::var("EFRSB_PAGE_COUNT") {
            config.page_count = count
                .parse()
                .map_err(|_| IngestError::Validation(format!("invalid EFRSB_PAGE_COUNT: {count}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(IngestError::Validation("base_url must not be empty".to_string()));
        }
        if self.base_url.ends_with('/') {
            return Err(IngestError::Validation(
                "base_url must not end with a slash (details links are resolved by concatenation)"
                    .to_string(),
            ));
        }
        if !self.messages_path.starts_with('/') {
            return Err(IngestError::Validation(
                "messages_path must start with a slash".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(IngestError::Validation("timeout_secs must be positive".to_string()));
        }
        if self.page_count == 0 {
            return Err(IngestError::Validation("page_count must be positive".to_string()));
        }
        Ok(())
    }

    /// Full URL of the message listing
    pub fn messages_url(&self) -> String {
        format!("{}{}", self.base_url, self.messages_path)
    }

    /// Config pointed at a local test server
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RegistryHttpConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.messages_url(),
            "https://old.bankrot.fedresurs.ru/Messages.aspx"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let mut config = RegistryHttpConfig::default();
        config.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trailing_slash_rejected() {
        let mut config = RegistryHttpConfig::default();
        config.base_url = "https://old.bankrot.fedresurs.ru/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = RegistryHttpConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_for_base_url() {
        let config = RegistryHttpConfig::for_base_url("http://127.0.0.1:9000");
        assert_eq!(config.messages_url(), "http://127.0.0.1:9000/Messages.aspx");
    }
}
