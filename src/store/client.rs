use crate::error::Result;
use crate::ingestion::types::Record;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Opaque scroll token issued by the store.
///
/// A cursor is good for exactly one continuation: every `scroll_continue` call hands back
/// a fresh cursor that replaces the one passed in. Holding on to an old value and
/// continuing it again yields `Error::CursorExpired`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollCursor(String);

impl ScrollCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScrollCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens run to hundreds of characters; a prefix is enough to correlate logs.
        let prefix: String = self.0.chars().take(12).collect();
        write!(f, "{}…", prefix)
    }
}

/// First page of a scrolled search.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub cursor: ScrollCursor,
    /// Total number of documents the query matched, across all pages.
    pub total_hits: u64,
    pub hits: Vec<Record>,
}

/// A continuation page.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub cursor: ScrollCursor,
    pub hits: Vec<Record>,
}

/// The narrow surface of the document store the index tooling depends on.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Runs `body` against `index` and opens a scroll context kept alive for `window`.
    async fn search(
        &self,
        index: &str,
        body: &str,
        page_size: usize,
        window: Duration,
    ) -> Result<SearchPage>;

    /// Fetches the next page for `cursor`, extending the context by `window`.
    async fn scroll_continue(&self, cursor: &ScrollCursor, window: Duration)
    -> Result<ScrollPage>;

    /// Creates or overwrites the document `id`.
    async fn upsert(&self, index: &str, id: &str, body: &Record) -> Result<()>;

    async fn delete_by_id(&self, index: &str, id: &str) -> Result<()>;

    async fn delete_index(&self, index: &str) -> Result<()>;
}
