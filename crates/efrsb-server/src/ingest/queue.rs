//! Job submission
//!
//! The pipeline submits work through the `JobQueue` trait; `ApalisQueue`
//! is the Postgres-backed implementation. Delivery is at-least-once and
//! no ordering between chunks is assumed.

use apalis::prelude::*;
use apalis_postgres::PostgresStorage;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::debug;

use super::jobs::{ParseMessagesJob, SaveMessagesJob};
use super::{IngestError, Result};

/// Hands jobs to the background queue
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn submit_parse(&self, job: ParseMessagesJob) -> Result<()>;
    async fn submit_save(&self, job: SaveMessagesJob) -> Result<()>;
}

/// apalis/Postgres queue backend
///
/// Pushing requires mutable storage handles, hence the mutexes; submission
/// is quick so contention stays negligible.
pub struct ApalisQueue {
    parse: Mutex<PostgresStorage<ParseMessagesJob>>,
    save: Mutex<PostgresStorage<SaveMessagesJob>>,
}

impl ApalisQueue {
    /// Create queue handles on the shared connection pool
    pub fn new(db: &PgPool) -> Self {
        Self {
            parse: Mutex::new(PostgresStorage::new(db)),
            save: Mutex::new(PostgresStorage::new(db)),
        }
    }
}

#[async_trait]
impl JobQueue for ApalisQueue {
    async fn submit_parse(&self, job: ParseMessagesJob) -> Result<()> {
        debug!(page_count = job.page_count, "submitting parse job");
        self.parse
            .lock()
            .await
            .push(job)
            .await
            .map_err(|e| IngestError::Queue(e.to_string()))?;
        Ok(())
    }

    async fn submit_save(&self, job: SaveMessagesJob) -> Result<()> {
        debug!(count = job.messages.len(), "submitting save chunk");
        self.save
            .lock()
            .await
            .push(job)
            .await
            .map_err(|e| IngestError::Queue(e.to_string()))?;
        Ok(())
    }
}
