//! Taxpayer and message persistence
//!
//! The pipeline talks to storage through the `TaxpayerStore` and
//! `MessageStore` traits so tests can substitute in-memory fakes.
//! `PgRegistryStore` is the Postgres implementation used in production.

use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::{PgPool, QueryBuilder};
use tracing::debug;

use super::models::{Message, NewMessage, SearchFilters, Taxpayer};

/// Read-only taxpayer lookup
///
/// Taxpayers are owned by the taxpayer-management service; ingestion only
/// resolves linkage by INN.
#[async_trait]
pub trait TaxpayerStore: Send + Sync {
    async fn get_by_inn(&self, inn: &str) -> Result<Option<Taxpayer>, sqlx::Error>;
}

/// Message persistence keyed by message number
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert or update a message
    ///
    /// `message_number` is the natural key: re-ingesting the same number
    /// refreshes the row instead of creating a duplicate.
    async fn create(&self, message: &NewMessage) -> Result<Message, sqlx::Error>;
}

/// Postgres-backed implementation of both store traits
#[derive(Clone)]
pub struct PgRegistryStore {
    db: PgPool,
}

impl PgRegistryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaxpayerStore for PgRegistryStore {
    async fn get_by_inn(&self, inn: &str) -> Result<Option<Taxpayer>, sqlx::Error> {
        sqlx::query_as::<_, Taxpayer>(
            r#"
            SELECT id, inn, snils, full_name, address, phone, email, created_at, updated_at
            FROM taxpayers
            WHERE inn = $1
            "#,
        )
        .bind(inn)
        .fetch_optional(&self.db)
        .await
    }
}

#[async_trait]
impl MessageStore for PgRegistryStore {
    async fn create(&self, message: &NewMessage) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (
                message_number, message_date, message_date_raw, debtor_name,
                debtor_inn, message_type, status, details_url, taxpayer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (message_number)
            DO UPDATE SET
                message_date    = EXCLUDED.message_date,
                message_date_raw = EXCLUDED.message_date_raw,
                debtor_name     = EXCLUDED.debtor_name,
                debtor_inn      = EXCLUDED.debtor_inn,
                message_type    = EXCLUDED.message_type,
                status          = EXCLUDED.status,
                details_url     = EXCLUDED.details_url,
                taxpayer_id     = COALESCE(EXCLUDED.taxpayer_id, messages.taxpayer_id)
            RETURNING
                id, message_number, message_date, message_date_raw, debtor_name,
                debtor_inn, debtor_snils, message_type, status, details_url,
                taxpayer_id, is_processed, processed_at, created_at
            "#,
        )
        .bind(&message.message_number)
        .bind(message.message_date)
        .bind(&message.message_date_raw)
        .bind(&message.debtor_name)
        .bind(&message.debtor_inn)
        .bind(&message.message_type)
        .bind(&message.status)
        .bind(&message.details_url)
        .bind(message.taxpayer_id)
        .fetch_one(&self.db)
        .await
    }
}

/// Search persisted messages; provided filters combine as AND
///
/// `name` is a case-insensitive substring match, dates bound the parsed
/// `message_date` inclusively.
pub async fn search_messages(
    pool: &PgPool,
    filters: &SearchFilters,
) -> Result<Vec<Message>, sqlx::Error> {
    let mut query = QueryBuilder::new(
        "SELECT id, message_number, message_date, message_date_raw, debtor_name, \
         debtor_inn, debtor_snils, message_type, status, details_url, \
         taxpayer_id, is_processed, processed_at, created_at \
         FROM messages WHERE TRUE",
    );

    if let Some(inn) = &filters.inn {
        query.push(" AND debtor_inn = ").push_bind(inn.clone());
    }
    if let Some(snils) = &filters.snils {
        query.push(" AND debtor_snils = ").push_bind(snils.clone());
    }
    if let Some(name) = &filters.name {
        query
            .push(" AND debtor_name ILIKE ")
            .push_bind(format!("%{name}%"));
    }
    if let Some(from) = filters.date_from {
        let midnight = from.and_time(NaiveTime::MIN).and_utc();
        query.push(" AND message_date >= ").push_bind(midnight);
    }
    if let Some(to) = filters.date_to {
        // Inclusive upper bound: anything before the next day's midnight.
        let next_midnight = to
            .succ_opt()
            .unwrap_or(to)
            .and_time(NaiveTime::MIN)
            .and_utc();
        query.push(" AND message_date < ").push_bind(next_midnight);
    }

    query.push(" ORDER BY message_date DESC NULLS LAST, created_at DESC LIMIT 100");

    debug!(?filters, "searching messages");

    query
        .build_query_as::<Message>()
        .fetch_all(pool)
        .await
}
