// Decoding of the interest-over-time payload
use crate::model::{SourceError, TimeSeriesTable};
use crate::utils::parse_datetime;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Column the upstream feed uses to flag incomplete buckets; never analysed.
const PARTIAL_COLUMN: &str = "isPartial";

pub trait Parser {
    fn parse(&self, body: &str, keywords: &[String]) -> Result<TimeSeriesTable, SourceError>;
}

#[derive(Debug, Deserialize)]
struct InterestPayload {
    timestamps: Vec<String>,
    #[serde(default)]
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

pub struct TrendsParser;

impl TrendsParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrendsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for TrendsParser {
    /// Columns come out in keyword order first, then any extra series alphabetically.
    fn parse(&self, body: &str, keywords: &[String]) -> Result<TimeSeriesTable, SourceError> {
        let payload: InterestPayload =
            serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

        let timestamps = payload
            .timestamps
            .iter()
            .map(|raw| {
                parse_datetime(raw).ok_or_else(|| SourceError::Parse(format!("bad timestamp '{}'", raw)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns = payload.columns;
        columns.remove(PARTIAL_COLUMN);

        let mut table = TimeSeriesTable::new(timestamps)?;
        for keyword in keywords {
            if let Some(values) = columns.remove(keyword) {
                table.set_column(keyword.clone(), to_values(values))?;
            }
        }
        for (name, values) in columns {
            table.set_column(name, to_values(values))?;
        }

        Ok(table)
    }
}

fn to_values(raw: Vec<Option<f64>>) -> Vec<f64> {
    raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["ETH".into(), "BTC".into()]
    }

    #[test]
    fn parses_payload_in_keyword_order() {
        let body = r#"{
            "timestamps": ["2024-10-15T00:00:00Z", "2024-10-15T01:00:00Z"],
            "columns": {
                "BTC": [1, 2],
                "ETH": [3, null],
                "isPartial": [0, 1]
            }
        }"#;
        let table = TrendsParser::new().parse(body, &keywords()).unwrap();

        assert_eq!(table.column_names(), vec!["ETH", "BTC"]);
        assert_eq!(table.len(), 2);
        assert!(table.column("ETH").unwrap()[1].is_nan());
        assert!(table.column(PARTIAL_COLUMN).is_none());
    }

    #[test]
    fn rejects_bad_timestamps() {
        let body = r#"{"timestamps": ["soon"], "columns": {"BTC": [1]}}"#;
        let err = TrendsParser::new().parse(body, &keywords()).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn rejects_ragged_columns() {
        let body = r#"{"timestamps": ["2024-10-15T00:00:00Z"], "columns": {"BTC": [1, 2]}}"#;
        let err = TrendsParser::new().parse(body, &keywords()).unwrap_err();
        assert!(matches!(err, SourceError::Table(_)));
    }
}
