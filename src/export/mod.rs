//! Export Module
//!
//! Serializes a date-filtered batch to a file in one of three encodings:
//!
//! - **KI**: line-delimited objects with string values, for the Kibana import tool.
//! - **ES**: one JSON array of documents, with nulls written as `"None"`.
//! - **CSV**: header row from the first record's keys, then one row per record.

pub mod types;
pub mod writer;

pub use types::{ExportRequest, ExportSummary, ExportTarget};
pub use writer::{export, resolve_export_path};
