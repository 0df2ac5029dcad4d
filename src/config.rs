//! Runtime configuration.
//!
//! Hard defaults live here. The binary reads each value from a flag or its environment
//! variable (`ES_URL`, `COVID_INDEX`, `COVID_SCROLL`, ...) and parses it with the helpers
//! below.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ES_URL: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "covid-19";
pub const DEFAULT_DATASET_URL: &str = "https://covidtracking.com/api/v1/states/daily.json";
pub const DEFAULT_EXPORT_DIR: &str = "data/export";
pub const DEFAULT_POPULATION_CSV: &str = "data/source/populationByState_2019.csv";
pub const DEFAULT_API_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_SCROLL_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub es_url: String,
    pub index: String,
    pub dataset_url: String,
    pub export_dir: PathBuf,
    pub population_csv: PathBuf,
    pub scroll_window: Duration,
    pub page_size: usize,
    pub api_bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            es_url: DEFAULT_ES_URL.to_string(),
            index: DEFAULT_INDEX.to_string(),
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            population_csv: PathBuf::from(DEFAULT_POPULATION_CSV),
            scroll_window: DEFAULT_SCROLL_WINDOW,
            page_size: DEFAULT_PAGE_SIZE,
            api_bind: DEFAULT_API_BIND.to_string(),
        }
    }
}

/// Parses a scroll window in the store's time-unit notation (`500ms`, `30s`, `1m`, `2h`).
pub fn parse_scroll_window(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| Error::validation(format!("scroll window '{}' has no unit", raw)))?;
    let (amount, unit) = raw.split_at(split);
    let amount: u64 = amount
        .parse()
        .map_err(|_| Error::validation(format!("scroll window '{}' is not numeric", raw)))?;

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount * 60)),
        "h" => Ok(Duration::from_secs(amount * 3600)),
        other => Err(Error::validation(format!(
            "unsupported scroll window unit '{}'",
            other
        ))),
    }
}

/// Renders a window back into the notation the store expects in `scroll=` parameters.
pub fn format_scroll_window(window: Duration) -> String {
    let millis = window.as_millis();
    if millis % 3_600_000 == 0 && millis > 0 {
        format!("{}h", millis / 3_600_000)
    } else if millis % 60_000 == 0 && millis > 0 {
        format!("{}m", millis / 60_000)
    } else if millis % 1000 == 0 && millis > 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

pub fn parse_page_size(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(Error::validation(format!(
            "page size must be a positive integer, got '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scroll_window_units() {
        assert_eq!(parse_scroll_window("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_scroll_window("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(
            parse_scroll_window("250ms").unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(parse_scroll_window("2h").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_parse_scroll_window_rejects_garbage() {
        assert!(matches!(parse_scroll_window("60"), Err(Error::Validation(_))));
        assert!(matches!(parse_scroll_window("m"), Err(Error::Validation(_))));
        assert!(matches!(parse_scroll_window("5d"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_format_scroll_window_picks_largest_unit() {
        assert_eq!(format_scroll_window(Duration::from_secs(60)), "1m");
        assert_eq!(format_scroll_window(Duration::from_secs(90)), "90s");
        assert_eq!(format_scroll_window(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_scroll_window(Duration::from_secs(3600)), "1h");
        assert_eq!(format_scroll_window(Duration::ZERO), "0ms");
    }

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size("10").unwrap(), 10);
        assert!(parse_page_size("0").is_err());
        assert!(parse_page_size("-3").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.index, "covid-19");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.scroll_window, Duration::from_secs(60));
    }
}
