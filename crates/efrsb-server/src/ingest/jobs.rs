//! Job definitions for message ingestion
//!
//! Defines the job types and payloads for the apalis job queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::models::ParsedMessage;
use super::DEFAULT_PAGE_COUNT;

/// Batch parse job payload
///
/// Walks the listing pages sequentially and hands accumulated records to
/// `SaveMessagesJob` chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseMessagesJob {
    /// Extra query parameters forwarded to the listing request.
    pub filters: HashMap<String, String>,
    /// Number of pages to walk, starting from page 1.
    pub page_count: u32,
    /// Timestamp when the job was created.
    pub created_at: DateTime<Utc>,
}

impl ParseMessagesJob {
    /// Create a parse job with the default page depth
    pub fn new(filters: HashMap<String, String>) -> Self {
        Self {
            filters,
            page_count: DEFAULT_PAGE_COUNT,
            created_at: Utc::now(),
        }
    }

    /// Override the page depth
    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }
}

/// Persistence job payload: one chunk of parsed records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMessagesJob {
    pub messages: Vec<ParsedMessage>,
    pub created_at: DateTime<Utc>,
}

impl SaveMessagesJob {
    pub fn new(messages: Vec<ParsedMessage>) -> Self {
        Self {
            messages,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a batch parse run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParseStats {
    /// Records parsed across all pages (not necessarily saved yet).
    pub total_parsed: usize,
    /// Pages skipped after a fetch or transport failure.
    pub pages_failed: usize,
    /// Persistence chunks handed to the queue.
    pub chunks_dispatched: usize,
}

/// Outcome of a persistence chunk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SaveStats {
    /// Records written to the store.
    pub saved: usize,
    /// Records skipped after a per-record persistence failure.
    pub failed: usize,
}

impl SaveStats {
    /// Merge another SaveStats into this one
    pub fn merge(self, other: Self) -> Self {
        Self {
            saved: self.saved + other.saved,
            failed: self.failed + other.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_defaults() {
        let job = ParseMessagesJob::new(HashMap::new());

        assert_eq!(job.page_count, DEFAULT_PAGE_COUNT);
        assert!(job.filters.is_empty());
    }

    #[test]
    fn test_parse_job_with_page_count() {
        let job = ParseMessagesJob::new(HashMap::new()).with_page_count(3);
        assert_eq!(job.page_count, 3);
    }

    #[test]
    fn test_parse_job_keeps_filters() {
        let mut filters = HashMap::new();
        filters.insert("regionid".to_string(), "77".to_string());

        let job = ParseMessagesJob::new(filters);
        assert_eq!(job.filters.get("regionid").map(String::as_str), Some("77"));
    }

    #[test]
    fn test_save_job_roundtrips_as_json() {
        let job = SaveMessagesJob::new(vec![ParsedMessage {
            message_number: "42".to_string(),
            message_date: None,
            message_date_raw: "01.01.2026".to_string(),
            debtor_name: "должник".to_string(),
            debtor_inn: Some("1234567890".to_string()),
            message_type: "тип".to_string(),
            status: "статус".to_string(),
            details_url: None,
        }]);

        let json = serde_json::to_string(&job).unwrap();
        let back: SaveMessagesJob = serde_json::from_str(&json).unwrap();
        assert_eq!(back.messages, job.messages);
    }

    #[test]
    fn test_save_stats_merge() {
        let a = SaveStats { saved: 90, failed: 10 };
        let b = SaveStats { saved: 50, failed: 0 };
        let merged = a.merge(b);

        assert_eq!(merged.saved, 140);
        assert_eq!(merged.failed, 10);
    }
}
