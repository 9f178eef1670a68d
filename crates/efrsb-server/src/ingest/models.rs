//! Parsed and persisted message/taxpayer types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One normalized row of the registry listing
///
/// This is the unit that travels through the pipeline and in
/// `SaveMessagesJob` payloads. The taxpayer linkage is resolved later, at
/// persistence time, so it is not part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// Registry message number, the natural key for idempotent re-ingestion.
    pub message_number: String,
    /// Publication date when the cell text parsed; the raw text is kept
    /// either way.
    pub message_date: Option<DateTime<Utc>>,
    pub message_date_raw: String,
    pub debtor_name: String,
    /// 10-12 digit INN shape-matched out of the debtor cell text.
    pub debtor_inn: Option<String>,
    pub message_type: String,
    pub status: String,
    /// Absolute URL of the details page, when the row carries a link.
    pub details_url: Option<String>,
}

/// Insert payload for the message store
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub message_number: String,
    pub message_date: Option<DateTime<Utc>>,
    pub message_date_raw: String,
    pub debtor_name: String,
    pub debtor_inn: Option<String>,
    pub message_type: String,
    pub status: String,
    pub details_url: Option<String>,
    pub taxpayer_id: Option<Uuid>,
}

impl NewMessage {
    /// Merge a parsed record with its (possibly absent) taxpayer linkage
    pub fn from_parsed(msg: &ParsedMessage, taxpayer_id: Option<Uuid>) -> Self {
        Self {
            message_number: msg.message_number.clone(),
            message_date: msg.message_date,
            message_date_raw: msg.message_date_raw.clone(),
            debtor_name: msg.debtor_name.clone(),
            debtor_inn: msg.debtor_inn.clone(),
            message_type: msg.message_type.clone(),
            status: msg.status.clone(),
            details_url: msg.details_url.clone(),
            taxpayer_id,
        }
    }
}

/// Persisted registry message (maps to the `messages` table)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub message_number: String,
    pub message_date: Option<DateTime<Utc>>,
    pub message_date_raw: String,
    pub debtor_name: String,
    pub debtor_inn: Option<String>,
    pub debtor_snils: Option<String>,
    pub message_type: String,
    pub status: String,
    pub details_url: Option<String>,
    pub taxpayer_id: Option<Uuid>,
    /// Set by the downstream consumer, never by the pipeline.
    pub is_processed: bool,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Taxpayer registry entity (maps to the `taxpayers` table)
///
/// Owned by the external taxpayer-management service; the pipeline only
/// reads it to resolve message linkage.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Taxpayer {
    pub id: Uuid,
    pub inn: String,
    pub snils: Option<String>,
    pub full_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for the message search endpoint; provided fields combine as AND
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub inn: Option<String>,
    pub snils: Option<String>,
    /// Case-insensitive substring match on the debtor name.
    pub name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl SearchFilters {
    /// True when no filter field is provided
    pub fn is_empty(&self) -> bool {
        self.inn.is_none()
            && self.snils.is_none()
            && self.name.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_parsed() -> ParsedMessage {
        ParsedMessage {
            message_number: "12345678".to_string(),
            message_date: None,
            message_date_raw: "01.02.2026".to_string(),
            debtor_name: "ООО Ромашка ИНН 7701234567".to_string(),
            debtor_inn: Some("7701234567".to_string()),
            message_type: "Сообщение о судебном акте".to_string(),
            status: "Опубликовано".to_string(),
            details_url: None,
        }
    }

    #[test]
    fn test_new_message_from_parsed_keeps_fields() {
        let parsed = sample_parsed();
        let taxpayer_id = Uuid::new_v4();
        let new = NewMessage::from_parsed(&parsed, Some(taxpayer_id));

        assert_eq!(new.message_number, parsed.message_number);
        assert_eq!(new.debtor_inn, parsed.debtor_inn);
        assert_eq!(new.taxpayer_id, Some(taxpayer_id));
    }

    #[test]
    fn test_new_message_without_linkage() {
        let new = NewMessage::from_parsed(&sample_parsed(), None);
        assert!(new.taxpayer_id.is_none());
    }

    #[test]
    fn test_search_filters_is_empty() {
        assert!(SearchFilters::default().is_empty());

        let filters = SearchFilters {
            inn: Some("7701234567".to_string()),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }
}
