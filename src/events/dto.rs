use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

/// Parses both dates and enforces that the event starts strictly before
/// it ends. Zero-length events are rejected.
pub fn parse_event_dates(
    start: &str,
    end: &str,
) -> Result<(OffsetDateTime, OffsetDateTime), ApiError> {
    let start = OffsetDateTime::parse(start, &Rfc3339).map_err(|_| ApiError::InvalidDateFormat)?;
    let end = OffsetDateTime::parse(end, &Rfc3339).map_err(|_| ApiError::InvalidDateFormat)?;
    if start >= end {
        return Err(ApiError::EndDateBeforeStart);
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_a_valid_range() {
        let (start, end) =
            parse_event_dates("2026-03-01T10:00:00Z", "2026-03-01T11:00:00Z").expect("parse");
        assert_eq!(start, datetime!(2026-03-01 10:00 UTC));
        assert_eq!(end, datetime!(2026-03-01 11:00 UTC));
    }

    #[test]
    fn offsets_are_honored() {
        let (start, end) =
            parse_event_dates("2026-03-01T10:00:00-03:00", "2026-03-01T14:00:00Z").expect("parse");
        assert_eq!(start, datetime!(2026-03-01 13:00 UTC));
        assert!(start < end);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for bad in ["2026-03-01", "mañana", "", "2026-03-01 10:00:00"] {
            let err = parse_event_dates(bad, "2026-03-01T11:00:00Z").unwrap_err();
            assert!(matches!(err, ApiError::InvalidDateFormat), "for {bad:?}");
        }
        let err = parse_event_dates("2026-03-01T10:00:00Z", "nope").unwrap_err();
        assert!(matches!(err, ApiError::InvalidDateFormat));
    }

    #[test]
    fn end_must_come_after_start() {
        let err =
            parse_event_dates("2026-03-01T11:00:00Z", "2026-03-01T10:00:00Z").unwrap_err();
        assert!(matches!(err, ApiError::EndDateBeforeStart));
    }

    #[test]
    fn zero_length_events_are_rejected() {
        let err =
            parse_event_dates("2026-03-01T10:00:00Z", "2026-03-01T10:00:00Z").unwrap_err();
        assert!(matches!(err, ApiError::EndDateBeforeStart));
    }
}
