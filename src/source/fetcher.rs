use crate::model::{SourceError, TimeSeriesTable};
use crate::parser::{Parser, TrendsParser};
use crate::source::traits::SeriesSource;
use crate::utils::keywords_query;

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) TrendWatch/0.1";

/// Pulls interest-over-time tables from an HTTP JSON endpoint.
pub struct HttpSeriesSource {
    client: Client,
    base_url: String,
    parser: TrendsParser,
}

impl HttpSeriesSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            parser: TrendsParser::new(),
        })
    }

    fn build_query(&self, keywords: &[String], timeframe: &str) -> [(&'static str, String); 2] {
        [
            ("keywords", keywords_query(keywords)),
            ("timeframe", timeframe.to_string()),
        ]
    }
}

impl SeriesSource for HttpSeriesSource {
    fn fetch_series(&self, keywords: &[String], timeframe: &str) -> Result<TimeSeriesTable, SourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.build_query(keywords, timeframe))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            warn!("Data endpoint answered {} for {:?}", status, keywords);
            return Err(SourceError::InvalidResponse(status.as_u16()));
        }

        let body = response.text()?;
        let table = self.parser.parse(&body, keywords)?;
        info!(
            "Got table with {} rows x {} columns ({})",
            table.len(),
            table.column_names().len(),
            timeframe
        );
        Ok(table)
    }
}
