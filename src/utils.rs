// Utility functions
use chrono::{DateTime, Utc};

/// Parses an RFC 3339 string into `DateTime<Utc>`, if possible.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Joins keywords into the comma-separated form the data endpoint expects.
pub fn keywords_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_offsets_into_utc() {
        let parsed = parse_datetime("2024-10-15T03:00:00+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 10, 15, 0, 0, 0).unwrap());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn keywords_are_trimmed_and_joined() {
        let keywords = vec![" BTC".to_string(), String::new(), "ETH ".to_string()];
        assert_eq!(keywords_query(&keywords), "BTC,ETH");
    }
}
