//! Timestamp utilities
//!
//! All stored timestamps use one fixed RFC 3339 shape (UTC, microseconds, `Z`
//! suffix) so that lexical order in SQL matches chronological order.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage in a TEXT column
pub fn to_storage(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time, formatted for storage
pub fn now_storage() -> String {
    to_storage(now())
}

/// Parse a stored timestamp back into UTC
pub fn parse_storage(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidInput(format!("Bad timestamp {:?}: {}", value, e)))
}

/// Parse a nullable stored timestamp
pub fn parse_storage_opt(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_storage).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_storage_format_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let b = a + Duration::milliseconds(1);

        let sa = to_storage(a);
        let sb = to_storage(b);

        assert_eq!(sa, "2024-01-02T03:04:05.000000Z");
        assert_eq!(sa.len(), sb.len());
        assert!(sa < sb, "Lexical order should match chronological order");
    }

    #[test]
    fn test_parse_storage_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2023, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(parse_storage(&to_storage(ts)).unwrap(), ts);
    }

    #[test]
    fn test_parse_storage_rejects_garbage() {
        assert!(parse_storage("yesterday").is_err());
        assert_eq!(parse_storage_opt(None).unwrap(), None);
    }
}
