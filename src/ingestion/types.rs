//! Ingestion Data Types
//!
//! Defines the record model shared by every stage of the pipeline (store, query,
//! curation, export) and the reports returned by the batch operations.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Start date used when the index holds no data yet, and the export default.
///
/// Set well before the first reported case so a fresh index captures everything.
pub const DEFAULT_START_DATE: i64 = 20190101;

/// Document id field. Every record is stored under this value.
pub const HASH_FIELD: &str = "hash";
/// Calendar date field, `YYYYMMDD`.
pub const DATE_FIELD: &str = "date";

static DATE_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{8}$").unwrap());

/// One day of figures for one region, as published by the upstream API.
///
/// Field order is preserved from the source document; exports rely on it for CSV headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The content hash used as the document id.
    pub fn hash(&self) -> Option<&str> {
        self.get(HASH_FIELD)
            .and_then(Value::as_str)
            .filter(|hash| !hash.is_empty())
    }

    pub fn date(&self) -> Option<i64> {
        self.int_field(DATE_FIELD)
    }

    /// Reads a field as an integer.
    ///
    /// Accepts JSON integers, floats (truncated toward zero) and numeric strings.
    /// Absent, `null`, boolean and non-numeric values read as `None`.
    pub fn int_field(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.is_finite())
                    .map(|value| value.trunc() as i64)
            }),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Reads a field as an integer, substituting `default` when it cannot be read.
    pub fn int_or(&self, field: &str, default: i64) -> i64 {
        self.int_field(field).unwrap_or(default)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::validation(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

/// Parses an 8-digit `YYYYMMDD` date parameter.
pub fn parse_date_param(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if !DATE_PARAM.is_match(raw) {
        return Err(Error::validation(format!(
            "incorrect date format '{}': dates must be YYYYmmdd (e.g. 20200301)",
            raw
        )));
    }
    raw.parse::<i64>()
        .map_err(|_| Error::validation(format!("date '{}' is out of range", raw)))
}

/// Parses an optional date parameter; blank or missing values yield `None`.
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date_param(value).map(Some),
        None => Ok(None),
    }
}

/// Outcome of a differential insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// Latest date already present in the index before this run.
    pub watermark: i64,
    /// Records that passed the watermark filter.
    pub attempted: usize,
    pub inserted: usize,
    pub failed: usize,
}

/// Outcome of a range deletion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteReport {
    pub attempted: usize,
    pub deleted: usize,
    pub failed: usize,
}
