use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use crate::ingest::IngestError;

use super::commands::{
    ParsePageCommand, ParsePageError, ScheduleBatchCommand, ScheduleBatchError,
};
use super::queries::{SearchMessagesError, SearchMessagesQuery};

pub fn parse_routes() -> Router<FeatureState> {
    Router::new()
        .route("/messages", post(parse_messages))
        .route("/messages/jobs", post(schedule_batch))
}

pub fn messages_routes() -> Router<FeatureState> {
    Router::new().route("/search", get(search_messages))
}

#[tracing::instrument(
    skip(state, command),
    fields(page = ?command.page, filter_count = command.filters.len())
)]
async fn parse_messages(
    State(state): State<FeatureState>,
    Json(command): Json<ParsePageCommand>,
) -> Result<Response, MessagesApiError> {
    let response = super::commands::parse_page::handle(state.pipeline, command).await?;

    tracing::info!(
        total_found = response.total_found,
        saved_to_db = response.saved_to_db,
        "Interactive parse completed"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(
    skip(state, command),
    fields(page_count = ?command.page_count, filter_count = command.filters.len())
)]
async fn schedule_batch(
    State(state): State<FeatureState>,
    Json(command): Json<ScheduleBatchCommand>,
) -> Result<Response, MessagesApiError> {
    let response = super::commands::schedule_batch::handle(state.queue, command).await?;

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(
    skip(state, query),
    fields(
        inn = ?query.inn,
        snils = ?query.snils,
        name = ?query.name,
        date_from = ?query.date_from,
        date_to = ?query.date_to
    )
)]
async fn search_messages(
    State(state): State<FeatureState>,
    Query(query): Query<SearchMessagesQuery>,
) -> Result<Response, MessagesApiError> {
    let response = super::queries::search::handle(state.db, query).await?;

    tracing::debug!(count = response.total, "Message search completed");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum MessagesApiError {
    Parse(ParsePageError),
    Schedule(ScheduleBatchError),
    Search(SearchMessagesError),
}

impl From<ParsePageError> for MessagesApiError {
    fn from(err: ParsePageError) -> Self {
        Self::Parse(err)
    }
}

impl From<ScheduleBatchError> for MessagesApiError {
    fn from(err: ScheduleBatchError) -> Self {
        Self::Schedule(err)
    }
}

impl From<SearchMessagesError> for MessagesApiError {
    fn from(err: SearchMessagesError) -> Self {
        Self::Search(err)
    }
}

impl IntoResponse for MessagesApiError {
    fn into_response(self) -> Response {
        match self {
            MessagesApiError::Parse(ParsePageError::InvalidPage)
            | MessagesApiError::Schedule(ScheduleBatchError::InvalidPageCount)
            | MessagesApiError::Search(SearchMessagesError::InvalidInn)
            | MessagesApiError::Search(SearchMessagesError::InvalidSnils)
            | MessagesApiError::Search(SearchMessagesError::InvalidDateRange) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            }
            MessagesApiError::Parse(ParsePageError::Registry(IngestError::Fetch(_))) => {
                tracing::error!("Registry fetch failed: {}", self);
                let error = ErrorResponse::new("UPSTREAM_ERROR", "The registry did not respond");
                (StatusCode::BAD_GATEWAY, Json(error)).into_response()
            }
            MessagesApiError::Parse(ParsePageError::Registry(_))
            | MessagesApiError::Schedule(ScheduleBatchError::Queue(_))
            | MessagesApiError::Search(SearchMessagesError::Database(_)) => {
                tracing::error!("Internal error during message operation: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            }
        }
    }
}

impl std::fmt::Display for MessagesApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{}", e),
            Self::Schedule(e) => write!(f, "{}", e),
            Self::Search(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessagesApiError::Parse(ParsePageError::InvalidPage);
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_routes_structure() {
        let router = parse_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
