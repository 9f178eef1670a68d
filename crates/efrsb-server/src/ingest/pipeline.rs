//! Ingestion pipeline orchestration
//!
//! Two entry points share the same fetch -> extract -> resolve -> persist
//! steps:
//!
//! - `run_single` serves the interactive endpoint: one page, persistence
//!   inline within the request, notification detached.
//! - `run_batch` serves the background parse job: a sequential page walk
//!   with per-page fault isolation, persistence offloaded in fixed-size
//!   chunks through the job queue and never awaited.
//!
//! Collaborators are injected as trait objects so tests run the pipeline
//! against in-memory fakes.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::fetcher::PageFetcher;
use super::jobs::{ParseStats, SaveMessagesJob, SaveStats};
use super::models::{NewMessage, ParsedMessage};
use super::notifier::Notifier;
use super::parser::MessageParser;
use super::queue::JobQueue;
use super::storage::{MessageStore, TaxpayerStore};
use super::{Result, PREVIEW_LIMIT, SAVE_CHUNK_SIZE};

/// Result of an interactive single-page run
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    /// Records parsed from the page.
    pub total_found: usize,
    /// Records persisted (those whose INN resolved to a known taxpayer).
    pub saved_to_db: usize,
    /// First few parsed records, for the caller's preview.
    pub preview: Vec<ParsedMessage>,
}

/// EFRSB message ingestion pipeline
pub struct EfrsbPipeline {
    fetcher: PageFetcher,
    parser: MessageParser,
    taxpayers: Arc<dyn TaxpayerStore>,
    messages: Arc<dyn MessageStore>,
    queue: Arc<dyn JobQueue>,
    notifier: Arc<dyn Notifier>,
}

impl EfrsbPipeline {
    /// Create a pipeline with injected collaborators
    pub fn new(
        fetcher: PageFetcher,
        parser: MessageParser,
        taxpayers: Arc<dyn TaxpayerStore>,
        messages: Arc<dyn MessageStore>,
        queue: Arc<dyn JobQueue>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            taxpayers,
            messages,
            queue,
            notifier,
        }
    }

    /// Walk pages 1..=page_count, dispatching persistence chunks to the queue
    ///
    /// One bad page never aborts the run: fetch failures are logged, the
    /// page is skipped and the walk continues. The pending buffer is
    /// drained into `SaveMessagesJob` chunks of `SAVE_CHUNK_SIZE` as soon
    /// as it fills, and any remainder is dispatched after the loop, so
    /// every record is submitted exactly once.
    pub async fn run_batch(
        &self,
        page_count: u32,
        filters: &HashMap<String, String>,
    ) -> ParseStats {
        info!(page_count, "starting batch parse run");

        let mut stats = ParseStats::default();
        let mut pending: Vec<ParsedMessage> = Vec::new();

        for page in 1..=page_count {
            let html = match self.fetcher.fetch(page, filters).await {
                Ok(html) => html,
                Err(e) => {
                    error!(page, error = %e, "page fetch failed, skipping");
                    stats.pages_failed += 1;
                    continue;
                },
            };

            let parsed = self.parser.parse_table(&html);
            debug!(page, count = parsed.len(), "parsed page");
            stats.total_parsed += parsed.len();
            pending.extend(parsed);

            while pending.len() >= SAVE_CHUNK_SIZE {
                let chunk: Vec<ParsedMessage> = pending.drain(..SAVE_CHUNK_SIZE).collect();
                self.dispatch_save(chunk, &mut stats).await;
            }
        }

        if !pending.is_empty() {
            let remainder = std::mem::take(&mut pending);
            self.dispatch_save(remainder, &mut stats).await;
        }

        info!(
            total_parsed = stats.total_parsed,
            pages_failed = stats.pages_failed,
            chunks_dispatched = stats.chunks_dispatched,
            "batch parse run completed"
        );

        stats
    }

    /// Interactive single-page run: fetch, parse, persist linked records,
    /// notify on the full batch
    ///
    /// The page fetch is the only fatal failure here; there is just one
    /// page, so there is nothing to continue with. Records whose INN does
    /// not resolve to a known taxpayer are counted but not persisted.
    /// Notification covers the full parsed batch, not just the persisted
    /// subset, and runs on a detached task.
    pub async fn run_single(
        &self,
        page: u32,
        filters: &HashMap<String, String>,
    ) -> Result<ParseOutcome> {
        let html = self.fetcher.fetch(page, filters).await?;
        let parsed = self.parser.parse_table(&html);
        info!(page, count = parsed.len(), "parsed interactive page");

        let mut saved_to_db = 0;
        for msg in &parsed {
            let Some(inn) = &msg.debtor_inn else {
                continue;
            };

            match self.taxpayers.get_by_inn(inn).await {
                Ok(Some(taxpayer)) => {
                    let new_message = NewMessage::from_parsed(msg, Some(taxpayer.id));
                    match self.messages.create(&new_message).await {
                        Ok(_) => saved_to_db += 1,
                        Err(e) => error!(
                            message_number = %msg.message_number,
                            error = %e,
                            "failed to store message"
                        ),
                    }
                },
                Ok(None) => {
                    debug!(inn, message_number = %msg.message_number, "no taxpayer for INN");
                },
                Err(e) => error!(inn, error = %e, "taxpayer lookup failed"),
            }
        }

        // Notify on the full parsed batch without holding the request open.
        let notifier = Arc::clone(&self.notifier);
        let batch = parsed.clone();
        tokio::spawn(async move {
            notifier.notify_batch(&batch).await;
        });

        let preview = parsed.iter().take(PREVIEW_LIMIT).cloned().collect();

        Ok(ParseOutcome {
            total_found: parsed.len(),
            saved_to_db,
            preview,
        })
    }

    /// Persist one chunk of parsed records (the save-job body)
    ///
    /// Per-record isolation: a failed taxpayer lookup or store write is
    /// logged and tallied, never aborts the chunk. Records without an INN,
    /// or with an INN no taxpayer matches, are still persisted here, just
    /// without linkage.
    pub async fn save_messages(&self, messages: &[ParsedMessage]) -> SaveStats {
        let mut stats = SaveStats::default();

        for msg in messages {
            let taxpayer_id = match &msg.debtor_inn {
                Some(inn) => match self.taxpayers.get_by_inn(inn).await {
                    Ok(taxpayer) => taxpayer.map(|t| t.id),
                    Err(e) => {
                        error!(inn, error = %e, "taxpayer lookup failed, skipping record");
                        stats.failed += 1;
                        continue;
                    },
                },
                None => None,
            };

            match self
                .messages
                .create(&NewMessage::from_parsed(msg, taxpayer_id))
                .await
            {
                Ok(_) => stats.saved += 1,
                Err(e) => {
                    error!(
                        message_number = %msg.message_number,
                        error = %e,
                        "failed to store message"
                    );
                    stats.failed += 1;
                },
            }
        }

        info!(saved = stats.saved, failed = stats.failed, "save chunk completed");
        stats
    }

    async fn dispatch_save(&self, chunk: Vec<ParsedMessage>, stats: &mut ParseStats) {
        let count = chunk.len();
        match self.queue.submit_save(SaveMessagesJob::new(chunk)).await {
            Ok(()) => {
                stats.chunks_dispatched += 1;
                debug!(count, "dispatched save chunk");
            },
            // Parsed counts still stand; the queue cannot replay a chunk
            // that was never enqueued.
            Err(e) => warn!(count, error = %e, "failed to dispatch save chunk"),
        }
    }
}
