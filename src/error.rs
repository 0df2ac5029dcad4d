//! Crate Error Taxonomy
//!
//! Every fallible operation in the library returns [`Result`]. The variants map onto the
//! four failure classes the index tooling distinguishes:
//!
//! - **Validation**: a parameter is missing or malformed; raised before any I/O happens.
//! - **Store**: a single document-store call failed. Batch operations log and count these
//!   instead of propagating them.
//! - **CursorExpired**: a scroll continuation was attempted with a cursor the store no
//!   longer holds. Never treated as "no more hits".
//! - **EmptyExport / Io**: the export could not produce a file.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required parameter is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The query name is not present in the registry.
    #[error("unknown query: {0}")]
    UnknownQuery(String),

    /// The scroll cursor expired (or was already consumed) before it was continued.
    #[error("scroll cursor expired before the next page was requested")]
    CursorExpired,

    /// A document store operation returned a failure status.
    #[error("store error ({status}): {message}")]
    Store { status: u16, message: String },

    /// A CSV export matched zero records, so no header row can be derived.
    #[error("nothing to export on or after {from_date}")]
    EmptyExport { from_date: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn store(status: u16, message: impl Into<String>) -> Self {
        Error::Store {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
