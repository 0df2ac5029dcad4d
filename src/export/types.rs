use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Output encoding of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportTarget {
    /// Kibana import format: one flat JSON object per line, every value a string.
    #[serde(rename = "KI")]
    Kibana,
    /// A single JSON array of documents.
    #[serde(rename = "ES")]
    Elastic,
    /// Comma-separated values with a header row.
    #[serde(rename = "CSV")]
    Csv,
}

impl ExportTarget {
    pub fn extension(self) -> &'static str {
        match self {
            ExportTarget::Kibana | ExportTarget::Elastic => "json",
            ExportTarget::Csv => "csv",
        }
    }
}

impl FromStr for ExportTarget {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "KI" => Ok(ExportTarget::Kibana),
            "ES" => Ok(ExportTarget::Elastic),
            "CSV" => Ok(ExportTarget::Csv),
            "" => Err(Error::validation("target param cannot be blank")),
            other => Err(Error::validation(format!(
                "unknown export target '{}': expected KI, ES or CSV",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportTarget::Kibana => "KI",
            ExportTarget::Elastic => "ES",
            ExportTarget::Csv => "CSV",
        };
        write!(f, "{}", name)
    }
}

/// What to export and where.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub target: ExportTarget,
    /// Destination file. A bare file name lands in the export directory; a missing
    /// extension is filled in from the target.
    #[serde(default)]
    pub path: Option<String>,
    /// Earliest date to include, `YYYYMMDD`. Blank means everything.
    #[serde(default)]
    pub from_date: Option<String>,
}

impl ExportRequest {
    pub fn new(target: ExportTarget) -> Self {
        Self {
            target,
            path: None,
            from_date: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_from_date(mut self, from_date: impl Into<String>) -> Self {
        self.from_date = Some(from_date.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub record_count: usize,
}
