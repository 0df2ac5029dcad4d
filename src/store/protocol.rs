//! Elasticsearch REST Protocol
//!
//! Endpoint names and the Data Transfer Objects exchanged with the store over HTTP.
//! Only the fields the scroll engine and the write path actually read are modelled;
//! everything else in the store's responses is ignored during deserialization.

use crate::ingestion::types::Record;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Search endpoint, appended to an index path.
pub const ENDPOINT_SEARCH: &str = "_search";
/// Scroll continuation endpoint, relative to the cluster root (`/_search/scroll`).
pub const ENDPOINT_SCROLL: &str = "scroll";
/// Single-document endpoint, appended to an index path.
pub const ENDPOINT_DOC: &str = "_doc";

/// Error type the store reports when a scroll context has been released.
pub const SEARCH_CONTEXT_MISSING: &str = "search_context_missing_exception";

// --- Data Transfer Objects ---

/// Body of a scroll continuation request.
#[derive(Debug, Serialize)]
pub struct ScrollRequest<'a> {
    /// Keep-alive for the refreshed context, e.g. `"1m"`.
    pub scroll: String,
    pub scroll_id: &'a str,
}

/// Response to both the initial search and every continuation.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Total match count.
///
/// Newer clusters report `{"value": n, "relation": "eq"}`; older ones a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Count(value) => *value,
            TotalHits::Object { value } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// The stored document. Restricted to the requested fields when the query sets `_source`.
    #[serde(rename = "_source", default)]
    pub source: Record,
}
