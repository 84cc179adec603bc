//! Display formatting for stored bill fields.

use chrono::{DateTime, Datelike, NaiveDate};

use crate::error::FormatError;

const MONTHS_FR: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Parses a stored bill date. Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and RFC 3339
/// timestamps.
pub fn parse_bill_date(raw: &str) -> Result<NaiveDate, FormatError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| FormatError::InvalidDate(raw.to_string()))
}

/// `2004-04-04` becomes `4 Avr. 04`.
pub fn format_naive_date(date: NaiveDate) -> String {
    let month = MONTHS_FR[date.month0() as usize];
    format!("{} {}. {}", date.day(), month, date.format("%y"))
}

pub fn format_date(raw: &str) -> Result<String, FormatError> {
    parse_bill_date(raw).map(format_naive_date)
}

pub fn format_status(code: &str) -> Result<&'static str, FormatError> {
    match code {
        "pending" => Ok("En attente"),
        "accepted" => Ok("Accepté"),
        "refused" => Ok("Refusé"),
        other => Err(FormatError::UnknownStatus(other.to_string())),
    }
}
