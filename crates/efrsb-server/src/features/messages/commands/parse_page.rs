use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ingest::models::ParsedMessage;
use crate::ingest::{EfrsbPipeline, IngestError};

const DEFAULT_PAGE: u32 = 1;

/// Interactive parse of a single registry page. Fetches, parses and
/// persists messages with a resolvable taxpayer, then returns a preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsePageCommand {
    /// Registry page to fetch (1-based). Defaults to the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Registry-side search filters forwarded as query parameters.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub filters: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsePageResponse {
    pub total_found: usize,
    pub saved_to_db: usize,
    pub preview: Vec<ParsedMessage>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParsePageError {
    #[error("Page must be greater than 0")]
    InvalidPage,
    #[error("Registry request failed: {0}")]
    Registry(#[from] IngestError),
}

impl ParsePageCommand {
    pub fn validate(&self) -> Result<(), ParsePageError> {
        if self.page == Some(0) {
            return Err(ParsePageError::InvalidPage);
        }
        Ok(())
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }
}

pub async fn handle(
    pipeline: Arc<EfrsbPipeline>,
    command: ParsePageCommand,
) -> Result<ParsePageResponse, ParsePageError> {
    command.validate()?;

    let outcome = pipeline.run_single(command.page(), &command.filters).await?;

    Ok(ParsePageResponse {
        total_found: outcome.total_found,
        saved_to_db: outcome.saved_to_db,
        preview: outcome.preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_page_zero() {
        let command = ParsePageCommand {
            page: Some(0),
            filters: HashMap::new(),
        };
        assert!(matches!(
            command.validate(),
            Err(ParsePageError::InvalidPage)
        ));
    }

    #[test]
    fn test_page_defaults_to_first() {
        let command = ParsePageCommand {
            page: None,
            filters: HashMap::new(),
        };
        assert!(command.validate().is_ok());
        assert_eq!(command.page(), 1);
    }

    #[test]
    fn test_command_deserializes_without_filters() {
        let command: ParsePageCommand =
            serde_json::from_str(r#"{"page": 3}"#).expect("valid JSON");
        assert_eq!(command.page(), 3);
        assert!(command.filters.is_empty());
    }
}
