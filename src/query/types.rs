use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_SCROLL_WINDOW};
use crate::error::{Error, Result};
use crate::ingestion::types::Record;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound on the number of records a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultCap {
    /// Every matched record.
    #[default]
    All,
    /// At most this many records. Always positive.
    Limit(usize),
}

impl ResultCap {
    pub fn limit(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::validation("return size must be positive"));
        }
        Ok(ResultCap::Limit(count))
    }

    /// Truncates an accumulated result set to the cap.
    pub fn apply(self, mut records: Vec<Record>) -> Vec<Record> {
        if let ResultCap::Limit(count) = self {
            records.truncate(count);
        }
        records
    }
}

impl FromStr for ResultCap {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all") {
            return Ok(ResultCap::All);
        }
        let count = raw.parse::<usize>().map_err(|_| {
            Error::validation(format!(
                "return size must be 'all' or a positive integer, got '{}'",
                raw
            ))
        })?;
        ResultCap::limit(count)
    }
}

impl fmt::Display for ResultCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCap::All => write!(f, "all"),
            ResultCap::Limit(count) => write!(f, "{}", count),
        }
    }
}

/// Parameters for one scrolled query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollOptions {
    /// How long the store keeps the cursor alive between calls.
    pub window: Duration,
    /// Records fetched per page.
    pub page_size: usize,
    pub cap: ResultCap,
}

impl ScrollOptions {
    pub fn with_cap(mut self, cap: ResultCap) -> Self {
        self.cap = cap;
        self
    }
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_SCROLL_WINDOW,
            page_size: DEFAULT_PAGE_SIZE,
            cap: ResultCap::All,
        }
    }
}
