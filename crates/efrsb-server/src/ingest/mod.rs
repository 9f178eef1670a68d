//! EFRSB message ingestion
//!
//! Everything needed to pull message listings from the public bankruptcy
//! registry (old.bankrot.fedresurs.ru) and land them in the database:
//!
//! - **config**: registry endpoint configuration (EFRSB_* environment variables)
//! - **fetcher**: HTTP client for paginated listing pages
//! - **parser**: table extraction and field normalization (INN, dates, links)
//! - **models**: parsed and persisted message/taxpayer types
//! - **storage**: `TaxpayerStore`/`MessageStore` traits and the Postgres impl
//! - **pipeline**: fetch -> extract -> resolve -> persist orchestration
//! - **notifier**: fire-and-forget batch notification
//! - **jobs**/**queue**/**scheduler**: apalis job definitions, submission and workers
//!
//! The pipeline takes its collaborators as trait objects so tests can
//! substitute in-memory fakes for the database, queue and notifier.

pub mod config;
pub mod fetcher;
pub mod jobs;
pub mod models;
pub mod notifier;
pub mod parser;
pub mod pipeline;
pub mod queue;
pub mod scheduler;
pub mod storage;

pub use config::RegistryHttpConfig;
pub use fetcher::{FetchError, PageFetcher};
pub use jobs::{ParseMessagesJob, ParseStats, SaveMessagesJob, SaveStats};
pub use models::{Message, NewMessage, ParsedMessage, SearchFilters, Taxpayer};
pub use notifier::{NoopNotifier, Notifier, WebhookNotifier};
pub use parser::MessageParser;
pub use pipeline::{EfrsbPipeline, ParseOutcome};
pub use queue::{ApalisQueue, JobQueue};
pub use scheduler::JobScheduler;
pub use storage::{MessageStore, PgRegistryStore, TaxpayerStore};

/// Records accumulated before a persistence chunk is handed to the queue.
pub const SAVE_CHUNK_SIZE: usize = 100;

/// Records returned as a preview by the interactive parse endpoint.
pub const PREVIEW_LIMIT: usize = 10;

/// Pages walked by a batch parse job when the request does not say otherwise.
pub const DEFAULT_PAGE_COUNT: u32 = 10;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error types for message ingestion
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Queue error: {0}")]
    Queue(String),
}

impl From<regex::Error> for IngestError {
    fn from(err: regex::Error) -> Self {
        IngestError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::Validation(err.to_string())
    }
}
