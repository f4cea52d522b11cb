//! Conversions between wire values and engine values.

use api_types::Decimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use engine::{MoneyCents, PageRequest, Quantity, parse_date};

use crate::ServerError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn page(page: Option<u64>, limit: Option<u64>) -> PageRequest {
    PageRequest::new(page, limit)
}

pub fn money(value: &Decimal) -> Result<MoneyCents, ServerError> {
    Ok(value.to_text().parse::<MoneyCents>()?)
}

/// Blank strings count as absent.
pub fn optional_money(value: Option<&Decimal>) -> Result<Option<MoneyCents>, ServerError> {
    match value {
        Some(value) if !value.to_text().is_empty() => money(value).map(Some),
        _ => Ok(None),
    }
}

/// Partial-update money: absent keeps, `null` or blank clears.
pub fn patch_money(
    value: Option<Option<Decimal>>,
) -> Result<Option<Option<MoneyCents>>, ServerError> {
    value
        .map(|value| optional_money(value.as_ref()))
        .transpose()
}

pub fn quantity(value: &Decimal) -> Result<Quantity, ServerError> {
    Ok(value.to_text().parse::<Quantity>()?)
}

/// Blank strings count as absent.
pub fn optional_date(value: Option<&str>, label: &str) -> Result<Option<NaiveDate>, ServerError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Ok(Some(parse_date(value, label)?)),
        None => Ok(None),
    }
}

/// Partial-update date: absent keeps, `null` or blank clears.
pub fn patch_date(
    value: Option<Option<String>>,
    label: &str,
) -> Result<Option<Option<NaiveDate>>, ServerError> {
    value
        .map(|value| optional_date(value.as_deref(), label))
        .transpose()
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, RFC 3339 or a bare `YYYY-MM-DD` (midnight).
pub fn optional_timestamp(
    value: Option<&str>,
    label: &str,
) -> Result<Option<DateTime<Utc>>, ServerError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(Some(naive.and_utc()));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    let day = parse_date(value, label)?;
    Ok(Some(day.and_time(chrono::NaiveTime::MIN).and_utc()))
}
