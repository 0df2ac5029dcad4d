use super::client::{DocumentStore, ScrollCursor, ScrollPage, SearchPage};
use super::protocol::*;
use crate::config::format_scroll_window;
use crate::error::{Error, Result};
use crate::ingestion::types::Record;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Document store client speaking the Elasticsearch REST API.
///
/// Owns connection settings only. Calls are issued one at a time and never retried;
/// a failed call surfaces to the caller, which decides whether to count it or abort.
pub struct ElasticClient {
    http_client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ElasticClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::validation(format!("invalid store url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "store url '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url,
            timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was rejected in the constructor.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::store(status.as_u16(), body))
    }
}

#[async_trait]
impl DocumentStore for ElasticClient {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .http_client
            .head(self.endpoint(&[index]))
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(Error::store(
                status.as_u16(),
                format!("index check for '{}' failed", index),
            )),
        }
    }

    async fn search(
        &self,
        index: &str,
        body: &str,
        page_size: usize,
        window: Duration,
    ) -> Result<SearchPage> {
        let response = self
            .http_client
            .post(self.endpoint(&[index, ENDPOINT_SEARCH]))
            .query(&[
                ("scroll", format_scroll_window(window)),
                ("size", page_size.to_string()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .timeout(self.timeout)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let search: SearchResponse = response.json().await?;

        let scroll_id = search
            .scroll_id
            .ok_or_else(|| Error::store(200, "search response carried no scroll id"))?;
        let total_hits = search
            .hits
            .total
            .as_ref()
            .map(TotalHits::value)
            .unwrap_or(search.hits.hits.len() as u64);

        tracing::debug!(
            "Search on '{}' matched {} documents (page size {})",
            index,
            total_hits,
            page_size
        );

        Ok(SearchPage {
            cursor: ScrollCursor::new(scroll_id),
            total_hits,
            hits: search.hits.hits.into_iter().map(|hit| hit.source).collect(),
        })
    }

    async fn scroll_continue(
        &self,
        cursor: &ScrollCursor,
        window: Duration,
    ) -> Result<ScrollPage> {
        let payload = ScrollRequest {
            scroll: format_scroll_window(window),
            scroll_id: cursor.as_str(),
        };
        let response = self
            .http_client
            .post(self.endpoint(&[ENDPOINT_SEARCH, ENDPOINT_SCROLL]))
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::NOT_FOUND || body.contains(SEARCH_CONTEXT_MISSING) {
                tracing::warn!("Scroll cursor {} is no longer valid", cursor);
                return Err(Error::CursorExpired);
            }
            return Err(Error::store(status.as_u16(), body));
        }

        let page: SearchResponse = response.json().await?;
        let next = page
            .scroll_id
            .map(ScrollCursor::new)
            .ok_or_else(|| Error::store(200, "scroll response carried no scroll id"))?;

        Ok(ScrollPage {
            cursor: next,
            hits: page.hits.hits.into_iter().map(|hit| hit.source).collect(),
        })
    }

    async fn upsert(&self, index: &str, id: &str, body: &Record) -> Result<()> {
        let response = self
            .http_client
            .put(self.endpoint(&[index, ENDPOINT_DOC, id]))
            .json(body)
            .timeout(self.timeout)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_by_id(&self, index: &str, id: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.endpoint(&[index, ENDPOINT_DOC, id]))
            .timeout(self.timeout)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.endpoint(&[index]))
            .timeout(self.timeout)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
