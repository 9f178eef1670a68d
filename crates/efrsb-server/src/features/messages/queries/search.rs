use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ingest::models::{Message, SearchFilters};
use crate::ingest::storage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMessagesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snils: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMessagesResponse {
    pub total: usize,
    pub messages: Vec<Message>,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchMessagesError {
    #[error("INN must consist of 10 to 12 digits")]
    InvalidInn,
    #[error("SNILS must consist of 11 digits")]
    InvalidSnils,
    #[error("date_from must not be after date_to")]
    InvalidDateRange,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SearchMessagesQuery {
    pub fn validate(&self) -> Result<(), SearchMessagesError> {
        if let Some(ref inn) = self.inn {
            if !(10..=12).contains(&inn.len()) || !inn.chars().all(|c| c.is_ascii_digit()) {
                return Err(SearchMessagesError::InvalidInn);
            }
        }

        if let Some(ref snils) = self.snils {
            if snils.len() != 11 || !snils.chars().all(|c| c.is_ascii_digit()) {
                return Err(SearchMessagesError::InvalidSnils);
            }
        }

        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(SearchMessagesError::InvalidDateRange);
            }
        }

        Ok(())
    }

    fn into_filters(self) -> SearchFilters {
        SearchFilters {
            inn: self.inn,
            snils: self.snils,
            name: self.name,
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

pub async fn handle(
    pool: PgPool,
    query: SearchMessagesQuery,
) -> Result<SearchMessagesResponse, SearchMessagesError> {
    query.validate()?;

    let messages = storage::search_messages(&pool, &query.into_filters()).await?;

    Ok(SearchMessagesResponse {
        total: messages.len(),
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_query() -> SearchMessagesQuery {
        SearchMessagesQuery {
            inn: None,
            snils: None,
            name: None,
            date_from: None,
            date_to: None,
        }
    }

    #[test]
    fn test_validate_empty_query_ok() {
        assert!(empty_query().validate().is_ok());
    }

    #[test]
    fn test_validate_inn_length() {
        let mut query = empty_query();
        query.inn = Some("123456789".to_string());
        assert!(matches!(
            query.validate(),
            Err(SearchMessagesError::InvalidInn)
        ));

        query.inn = Some("1234567890".to_string());
        assert!(query.validate().is_ok());

        query.inn = Some("123456789012".to_string());
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_validate_inn_rejects_non_digits() {
        let mut query = empty_query();
        query.inn = Some("12345678ab".to_string());
        assert!(matches!(
            query.validate(),
            Err(SearchMessagesError::InvalidInn)
        ));
    }

    #[test]
    fn test_validate_snils() {
        let mut query = empty_query();
        query.snils = Some("12345678901".to_string());
        assert!(query.validate().is_ok());

        query.snils = Some("1234567890".to_string());
        assert!(matches!(
            query.validate(),
            Err(SearchMessagesError::InvalidSnils)
        ));
    }

    #[test]
    fn test_validate_date_range() {
        let mut query = empty_query();
        query.date_from = NaiveDate::from_ymd_opt(2026, 2, 1);
        query.date_to = NaiveDate::from_ymd_opt(2026, 1, 1);
        assert!(matches!(
            query.validate(),
            Err(SearchMessagesError::InvalidDateRange)
        ));

        query.date_to = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert!(query.validate().is_ok());
    }
}
