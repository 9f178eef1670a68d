//! Feature modules implementing the HTTP API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes. Commands mutate state (and run the pipeline), queries read;
//! handlers are plain `handle(state, input)` functions invoked directly
//! from the routes.

pub mod messages;

use axum::Router;
use std::sync::Arc;

use crate::ingest::{EfrsbPipeline, JobQueue};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for query handlers.
    pub db: sqlx::PgPool,
    /// The ingestion pipeline backing the interactive parse command.
    pub pipeline: Arc<EfrsbPipeline>,
    /// Queue for enqueueing background parse jobs.
    pub queue: Arc<dyn JobQueue>,
}

/// Creates the main API router with all feature routes mounted
///
/// - `/parse`: interactive parse command and batch-job enqueueing
/// - `/messages`: persisted message search
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/parse", messages::parse_routes().with_state(state.clone()))
        .nest("/messages", messages::messages_routes().with_state(state))
}
