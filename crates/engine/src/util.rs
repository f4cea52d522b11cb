//! Internal helpers for input validation and conversion.
//!
//! These utilities centralize normalization so every operation enforces the
//! same invariants. Only [`parse_date`] is re-exported.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Parse a signed decimal string with at most two fractional digits into an
/// integer number of hundredths.
pub(crate) fn parse_hundredths(s: &str, label: &str) -> ResultEngine<i64> {
    let empty = || EngineError::InvalidAmount(format!("empty {label}"));
    let invalid = || EngineError::InvalidAmount(format!("invalid {label}"));
    let overflow = || EngineError::InvalidAmount(format!("{label} too large"));

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let whole_str = parts.next().ok_or_else(invalid)?;
    let frac_str = parts.next();
    if parts.next().is_some() {
        return Err(invalid());
    }

    if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let whole: i64 = whole_str.parse().map_err(|_| overflow())?;

    let frac: i64 = match frac_str {
        None | Some("") => 0,
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            match frac.len() {
                1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                2 => frac.parse::<i64>().map_err(|_| invalid())?,
                _ => {
                    return Err(EngineError::InvalidAmount(format!(
                        "too many decimals in {label}"
                    )));
                }
            }
        }
    };

    let total = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(overflow)?;

    if negative {
        total.checked_neg().ok_or_else(overflow)
    } else {
        Ok(total)
    }
}

/// Trim and NFC-normalize a value used as part of a lookup key.
pub(crate) fn normalize_key(value: &str) -> String {
    value.trim().nfc().collect()
}

/// Trim a required field, rejecting blank values.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional field; blank values collapse to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// ```rust
/// use engine::parse_date;
///
/// assert!(parse_date("2026-01-31", "cutting_time").is_ok());
/// assert!(parse_date("31/01/2026", "cutting_time").is_err());
/// ```
pub fn parse_date(value: &str, label: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidInput(format!("invalid {label}: expected YYYY-MM-DD")))
}

/// Parse a date used as a list filter. Malformed values are ignored.
pub(crate) fn parse_date_filter(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// `[start, end)` UTC bounds of a calendar day.
pub(crate) fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}

/// Reject negative monetary values on records.
pub(crate) fn ensure_non_negative(
    value: Option<crate::MoneyCents>,
    label: &str,
) -> ResultEngine<()> {
    if value.is_some_and(|v| v.is_negative()) {
        return Err(EngineError::InvalidAmount(format!("{label} must be >= 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_composes_unicode() {
        // "e" + combining acute accent becomes a single code point.
        assert_eq!(normalize_key("  Cafe\u{301} "), "Caf\u{e9}");
    }

    #[test]
    fn required_rejects_blank() {
        assert!(normalize_required("   ", "name").is_err());
        assert_eq!(normalize_required(" Rose ", "name").unwrap(), "Rose");
    }

    #[test]
    fn date_filter_ignores_garbage() {
        assert_eq!(parse_date_filter(Some("not a date")), None);
        assert_eq!(parse_date_filter(Some("")), None);
        assert_eq!(
            parse_date_filter(Some("2026-03-01")),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn day_bounds_span_one_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let (start, end) = day_bounds(date);
        assert_eq!(end - start, chrono::Duration::days(1));
        assert_eq!(start.date_naive(), date);
    }
}
