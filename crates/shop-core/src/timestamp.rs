//! Wire format for timestamps: RFC 3339, UTC, millisecond precision.

use anyhow::Context as _;
use chrono::{DateTime, SecondsFormat, Utc};

pub fn format_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn format_optional(dt: Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(format_rfc3339)
}

pub fn parse_rfc3339(value: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp {value:?}"))
}

/// Absent and empty strings both mean "not set".
pub fn parse_optional(value: Option<&str>) -> anyhow::Result<Option<DateTime<Utc>>> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => parse_rfc3339(v).map(Some),
    }
}
