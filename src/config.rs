use crate::normalizer::Columns;
use crate::service::PollSettings;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Columns to analyse: either `"BTC,ETH"` or `["BTC", "ETH"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnsConfig {
    Text(String),
    List(Vec<String>),
}

impl From<&ColumnsConfig> for Columns {
    fn from(cfg: &ColumnsConfig) -> Self {
        match cfg {
            ColumnsConfig::Text(text) => Columns::from(text.as_str()),
            ColumnsConfig::List(names) => Columns::from(names.as_slice()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub source_url: String,
    pub keywords: Vec<String>,
    /// Defaults to every keyword.
    #[serde(default)]
    pub columns: Option<ColumnsConfig>,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default = "default_window")]
    pub window: i64,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub fetch_retries: u32,
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

fn default_timeframe() -> String {
    "today 5-y".into()
}

fn default_window() -> i64 {
    20
}

fn default_output_path() -> String {
    "out.csv".into()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

fn default_retry_base_delay() -> u64 {
    1000
}

impl AppConfig {
    pub fn columns(&self) -> Columns {
        match &self.columns {
            Some(cfg) => cfg.into(),
            None => Columns::from(self.keywords.as_slice()),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_seconds),
            fetch_retries: self.fetch_retries,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.keywords.is_empty() {
            return Err("config: at least one keyword is required".into());
        }
        if self.window < 0 {
            return Err(format!("config: window must be non-negative, got {}", self.window).into());
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_defaults() {
        let cfg = parse_config(r#"{"source_url": "http://localhost/trends", "keywords": ["BTC", "ETH"]}"#).unwrap();
        assert_eq!(cfg.window, 20);
        assert_eq!(cfg.output_path, "out.csv");
        assert_eq!(cfg.poll_settings().interval, Duration::from_secs(60));
        assert_eq!(cfg.poll_settings().fetch_retries, 0);
        assert_eq!(cfg.columns().iter().collect::<Vec<_>>(), vec!["BTC", "ETH"]);
    }

    #[test]
    fn columns_accept_string_or_list() {
        let text = parse_config(r#"{"source_url": "u", "keywords": ["BTC"], "columns": "BTC, ETH"}"#).unwrap();
        let list = parse_config(r#"{"source_url": "u", "keywords": ["BTC"], "columns": ["BTC", "ETH"]}"#).unwrap();
        assert_eq!(text.columns(), list.columns());
    }

    #[test]
    fn rejects_negative_window_and_empty_keywords() {
        assert!(parse_config(r#"{"source_url": "u", "keywords": ["BTC"], "window": -1}"#).is_err());
        assert!(parse_config(r#"{"source_url": "u", "keywords": []}"#).is_err());
    }
}
