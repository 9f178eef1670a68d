//! Job scheduler
//!
//! Sets up and manages the apalis workers with PostgreSQL storage.

use anyhow::Result;
use apalis::prelude::*;
use apalis_postgres::PostgresStorage;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use super::jobs::{ParseMessagesJob, SaveMessagesJob};
use super::pipeline::EfrsbPipeline;

/// Job scheduler
pub struct JobScheduler {
    db: PgPool,
    pipeline: Arc<EfrsbPipeline>,
}

impl JobScheduler {
    /// Create a new job scheduler
    pub fn new(db: PgPool, pipeline: Arc<EfrsbPipeline>) -> Self {
        Self { db, pipeline }
    }

    /// Start the workers
    ///
    /// Runs the apalis schema setup, then registers one worker per job
    /// type against the shared PostgreSQL queue storage.
    pub async fn start(self) -> Result<JoinHandle<()>> {
        info!("starting job scheduler");

        PostgresStorage::setup(&self.db).await?;

        let parse_storage: PostgresStorage<ParseMessagesJob> = PostgresStorage::new(&self.db);
        let save_storage: PostgresStorage<SaveMessagesJob> = PostgresStorage::new(&self.db);
        let pipeline = self.pipeline;

        let handle = tokio::spawn(async move {
            info!("job workers started");
            if let Err(e) = Monitor::new()
                .register({
                    let pipeline = pipeline.clone();
                    let storage = parse_storage.clone();
                    move |_index| {
                        WorkerBuilder::new("efrsb-parse-worker")
                            .backend(storage.clone())
                            .data(pipeline.clone())
                            .build(process_parse_job)
                    }
                })
                .register({
                    let pipeline = pipeline.clone();
                    let storage = save_storage.clone();
                    move |_index| {
                        WorkerBuilder::new("efrsb-save-worker")
                            .backend(storage.clone())
                            .data(pipeline.clone())
                            .build(process_save_job)
                    }
                })
                .run()
                .await
            {
                tracing::error!("job worker error: {:?}", e);
            }
            info!("job workers stopped");
        });

        Ok(handle)
    }
}

/// Process one batch parse job
///
/// The run itself never fails; per-page errors are isolated inside the
/// pipeline and reflected in the stats.
async fn process_parse_job(
    job: ParseMessagesJob,
    pipeline: Data<Arc<EfrsbPipeline>>,
) -> Result<()> {
    info!(page_count = job.page_count, "processing parse job");

    let stats = pipeline.run_batch(job.page_count, &job.filters).await;

    info!(
        total_parsed = stats.total_parsed,
        pages_failed = stats.pages_failed,
        "parse job completed"
    );

    Ok(())
}

/// Process one persistence chunk
async fn process_save_job(job: SaveMessagesJob, pipeline: Data<Arc<EfrsbPipeline>>) -> Result<()> {
    info!(count = job.messages.len(), "processing save job");

    let stats = pipeline.save_messages(&job.messages).await;

    info!(saved = stats.saved, failed = stats.failed, "save job completed");

    Ok(())
}
