//! Table extraction and field normalization for registry listing pages
//!
//! The listing is a server-rendered ASP.NET grid. The primary selector
//! targets the grid's control id; older renderings of the page only carry
//! the generic `grid` class, hence the fallback. Pages without either table
//! are treated as having no data, not as malformed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::models::ParsedMessage;
use super::{IngestError, Result};

/// Id of the message grid on the listing page.
const PRIMARY_TABLE_SELECTOR: &str = "table#ctl00_cphBody_gvMessages";

/// Fallback marker used by older page renderings.
const FALLBACK_TABLE_SELECTOR: &str = "table.grid";

/// A data row carries at least these cells; shorter rows are ads or
/// separators and are dropped.
const MIN_CELLS: usize = 6;

/// Cell text timestamp formats, most specific first.
const DATE_FORMATS: [&str; 2] = ["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M"];
const DATE_ONLY_FORMAT: &str = "%d.%m.%Y";

/// Extracts message records from listing markup
pub struct MessageParser {
    base_url: String,
    primary_table: Selector,
    fallback_table: Selector,
    row: Selector,
    cell: Selector,
    anchor: Selector,
    inn_pattern: Regex,
}

impl MessageParser {
    /// Create a parser resolving details links against `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            primary_table: parse_selector(PRIMARY_TABLE_SELECTOR)?,
            fallback_table: parse_selector(FALLBACK_TABLE_SELECTOR)?,
            row: parse_selector("tr")?,
            cell: parse_selector("td")?,
            anchor: parse_selector("a")?,
            // Shape match only: 10-12 digits on word boundaries. A longer
            // digit run must not match a substring of itself.
            inn_pattern: Regex::new(r"\b\d{10,12}\b")?,
        })
    }

    /// Extract all message records from a listing page
    ///
    /// Returns an empty vec when neither table selector matches. The first
    /// row of the table is the header and is skipped; rows with fewer than
    /// six cells are dropped.
    pub fn parse_table(&self, html: &str) -> Vec<ParsedMessage> {
        let document = Html::parse_document(html);

        let table = document
            .select(&self.primary_table)
            .next()
            .or_else(|| document.select(&self.fallback_table).next());

        let Some(table) = table else {
            debug!("no message table found on page");
            return Vec::new();
        };

        let mut messages = Vec::new();
        for row in table.select(&self.row).skip(1) {
            let cells: Vec<ElementRef> = row.select(&self.cell).collect();
            if cells.len() < MIN_CELLS {
                continue;
            }

            let date_raw = cell_text(&cells[1]);
            let debtor_name = cell_text(&cells[2]);

            messages.push(ParsedMessage {
                message_number: cell_text(&cells[0]),
                message_date: parse_message_date(&date_raw),
                message_date_raw: date_raw,
                debtor_inn: self.extract_inn(&debtor_name),
                debtor_name,
                message_type: cell_text(&cells[3]),
                status: cell_text(&cells[4]),
                details_url: self.extract_details_link(&cells[5]),
            });
        }

        messages
    }

    /// First 10-12 digit run in `text`, if any
    ///
    /// Pure shape match; INN checksums are not validated here.
    pub fn extract_inn(&self, text: &str) -> Option<String> {
        self.inn_pattern
            .find(text)
            .map(|m| m.as_str().to_string())
    }

    /// Absolute details URL from the first anchor in the cell, if any
    pub fn extract_details_link(&self, cell: &ElementRef) -> Option<String> {
        cell.select(&self.anchor)
            .find_map(|a| a.value().attr("href"))
            .map(|href| format!("{}{}", self.base_url, href))
    }
}

/// Parse a listing timestamp; `None` when the text fits no known format
pub fn parse_message_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    for format in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, DATE_ONLY_FORMAT)
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| IngestError::Parse(format!("invalid selector {selector:?}: {e}")))
}

/// Concatenated, trimmed text content of a cell
fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const BASE_URL: &str = "https://old.bankrot.fedresurs.ru";

    fn parser() -> MessageParser {
        MessageParser::new(BASE_URL).unwrap()
    }

    fn page_with_table(table_attrs: &str, rows: &str) -> String {
        format!(
            "<html><body><table {table_attrs}>\
             <tr><th>№</th><th>Дата</th><th>Должник</th><th>Тип</th><th>Статус</th><th></th></tr>\
             {rows}\
             </table></body></html>"
        )
    }

    fn data_row(number: &str, debtor: &str) -> String {
        format!(
            "<tr><td>{number}</td><td>01.02.2026 10:30:00</td><td>{debtor}</td>\
             <td>Сообщение о судебном акте</td><td>Опубликовано</td>\
             <td><a href=\"/Details.aspx?ID={number}\">просмотр</a></td></tr>"
        )
    }

    #[test]
    fn test_parse_table_primary_selector() {
        let html = page_with_table(
            "id=\"ctl00_cphBody_gvMessages\"",
            &data_row("100", "ООО Ромашка ИНН 7701234567"),
        );
        let messages = parser().parse_table(&html);

        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.message_number, "100");
        assert_eq!(msg.debtor_inn.as_deref(), Some("7701234567"));
        assert_eq!(msg.status, "Опубликовано");
        assert_eq!(
            msg.details_url.as_deref(),
            Some("https://old.bankrot.fedresurs.ru/Details.aspx?ID=100")
        );
    }

    #[test]
    fn test_parse_table_fallback_selector() {
        let html = page_with_table("class=\"grid\"", &data_row("200", "Иванов Иван"));
        let messages = parser().parse_table(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_number, "200");
        assert!(messages[0].debtor_inn.is_none());
    }

    #[test]
    fn test_parse_table_missing_table_yields_empty() {
        let html = "<html><body><p>технические работы</p></body></html>";
        assert!(parser().parse_table(html).is_empty());
    }

    #[test]
    fn test_parse_table_drops_short_rows() {
        let rows = format!(
            "{}<tr><td colspan=\"6\">реклама</td></tr><tr><td>a</td><td>b</td></tr>{}",
            data_row("1", "должник один"),
            data_row("2", "должник два"),
        );
        let html = page_with_table("class=\"grid\"", &rows);
        let messages = parser().parse_table(&html);

        // Header skipped, two malformed rows dropped, two records kept.
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message_number, "1");
        assert_eq!(messages[1].message_number, "2");
    }

    #[test]
    fn test_parse_table_prefers_primary_table() {
        let html = format!(
            "<html><body>\
             <table class=\"grid\"><tr><th></th></tr>{}</table>\
             <table id=\"ctl00_cphBody_gvMessages\"><tr><th></th></tr>{}</table>\
             </body></html>",
            data_row("900", "из запасной таблицы"),
            data_row("901", "из основной таблицы"),
        );
        let messages = parser().parse_table(&html);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_number, "901");
    }

    #[test]
    fn test_extract_inn_ten_digits() {
        assert_eq!(
            parser().extract_inn("ИНН 1234567890"),
            Some("1234567890".to_string())
        );
    }

    #[test]
    fn test_extract_inn_twelve_digits() {
        assert_eq!(
            parser().extract_inn("ИП Петров, ИНН 526317984689"),
            Some("526317984689".to_string())
        );
    }

    #[test]
    fn test_extract_inn_absent() {
        assert!(parser().extract_inn("без номера").is_none());
    }

    #[test]
    fn test_extract_inn_rejects_longer_run() {
        // 13 digits: the bounded pattern must not match a substring of the run.
        assert!(parser().extract_inn("счет 1234567890123").is_none());
    }

    #[test]
    fn test_extract_inn_matches_isolated_eleven_digit_run() {
        // Shape match only: any isolated 10-12 digit run counts,
        // including phone-shaped ones.
        assert_eq!(
            parser().extract_inn("тел 89991234567"),
            Some("89991234567".to_string())
        );
    }

    #[test]
    fn test_extract_inn_takes_first_match() {
        assert_eq!(
            parser().extract_inn("ИНН 1234567890 и 9876543210"),
            Some("1234567890".to_string())
        );
    }

    #[test]
    fn test_parse_message_date_with_time() {
        let date = parse_message_date("15.03.2026 14:05:09").unwrap();
        assert_eq!(date.year(), 2026);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_message_date_date_only() {
        let date = parse_message_date("01.12.2025").unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 12);
    }

    #[test]
    fn test_parse_message_date_garbage_is_none() {
        assert!(parse_message_date("дата уточняется").is_none());
        assert!(parse_message_date("2026-03-15").is_none());
    }

    #[test]
    fn test_no_anchor_yields_no_details_url() {
        let rows = "<tr><td>300</td><td>01.02.2026</td><td>должник</td>\
                    <td>тип</td><td>статус</td><td>нет ссылки</td></tr>";
        let html = page_with_table("class=\"grid\"", rows);
        let messages = parser().parse_table(&html);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].details_url.is_none());
    }

    #[test]
    fn test_unparseable_date_keeps_raw_text() {
        let rows = "<tr><td>301</td><td>дата не указана</td><td>должник</td>\
                    <td>тип</td><td>статус</td><td></td></tr>";
        let html = page_with_table("class=\"grid\"", rows);
        let messages = parser().parse_table(&html);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].message_date.is_none());
        assert_eq!(messages[0].message_date_raw, "дата не указана");
    }
}
