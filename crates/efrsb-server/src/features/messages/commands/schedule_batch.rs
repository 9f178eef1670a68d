use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ingest::jobs::ParseMessagesJob;
use crate::ingest::{IngestError, JobQueue, DEFAULT_PAGE_COUNT};

/// Enqueues a background batch parse covering pages 1..=page_count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleBatchCommand {
    /// How many registry pages the job should walk. Defaults to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Registry-side search filters forwarded as query parameters.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub filters: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleBatchResponse {
    pub page_count: u32,
    pub status: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleBatchError {
    #[error("Page count must be greater than 0")]
    InvalidPageCount,
    #[error("Failed to enqueue job: {0}")]
    Queue(#[from] IngestError),
}

impl ScheduleBatchCommand {
    pub fn validate(&self) -> Result<(), ScheduleBatchError> {
        if self.page_count == Some(0) {
            return Err(ScheduleBatchError::InvalidPageCount);
        }
        Ok(())
    }

    pub fn page_count(&self) -> u32 {
        self.page_count.unwrap_or(DEFAULT_PAGE_COUNT)
    }
}

pub async fn handle(
    queue: Arc<dyn JobQueue>,
    command: ScheduleBatchCommand,
) -> Result<ScheduleBatchResponse, ScheduleBatchError> {
    command.validate()?;

    let page_count = command.page_count();
    let job = ParseMessagesJob::new(command.filters).with_page_count(page_count);
    queue.submit_parse(job).await?;

    tracing::info!(page_count, "Enqueued batch parse job");

    Ok(ScheduleBatchResponse {
        page_count,
        status: "queued",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_pages() {
        let command = ScheduleBatchCommand {
            page_count: Some(0),
            filters: HashMap::new(),
        };
        assert!(matches!(
            command.validate(),
            Err(ScheduleBatchError::InvalidPageCount)
        ));
    }

    #[test]
    fn test_page_count_defaults() {
        let command = ScheduleBatchCommand {
            page_count: None,
            filters: HashMap::new(),
        };
        assert_eq!(command.page_count(), DEFAULT_PAGE_COUNT);
    }
}
