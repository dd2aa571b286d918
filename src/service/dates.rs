use crate::error::MedError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Formats tried in order. Four-digit-year formats come first and reject
/// years below 1000 so short years fall through to the `%y` variants.
const FORMATS: &[(&str, bool)] = &[
    ("%Y-%m-%d", true),
    ("%d-%m-%Y", true),
    ("%d/%m/%Y", true),
    ("%Y/%m/%d", true),
    ("%d %b %Y", true),
    ("%d %B %Y", true),
    ("%d-%m-%y", false),
    ("%d/%m/%y", false),
];

/// Timestamps without an offset. The date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a user-entered date in any of the accepted layouts.
pub fn parse_flexible(input: &str) -> Result<NaiveDate, MedError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(MedError::validation("Empty date."));
    }

    // offset timestamps keep the calendar date as written, not the UTC one
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt.date());
    }

    FORMATS
        .iter()
        .filter_map(|(fmt, four_digit_year)| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .filter(|d| !four_digit_year || d.year() >= 1000)
        })
        .next()
        .ok_or_else(|| {
            MedError::validation(format!(
                "Could not parse date '{s}'. Use YYYY-MM-DD or DD-MM-YYYY or DD/MM/YYYY."
            ))
        })
}

/// `None` for a missing or blank field, otherwise a parsed date.
pub fn parse_optional(input: Option<&str>) -> Result<Option<NaiveDate>, MedError> {
    match input.map(str::trim) {
        Some(s) if !s.is_empty() => parse_flexible(s).map(Some),
        _ => Ok(None),
    }
}
