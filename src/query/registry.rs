//! Query Definition Registry
//!
//! Maps query names (e.g. "getMaxDate") to pre-serialized query bodies. The scroll engine
//! only ever runs queries by name, so callers cannot smuggle arbitrary bodies through the
//! action surface without registering them first.

use crate::error::{Error, Result};

use dashmap::DashMap;
use std::sync::Arc;

/// Latest stored date first, projected down to the date field.
pub const QUERY_MAX_DATE: &str = "getMaxDate";
/// Earliest stored date first, projected down to the date field.
pub const QUERY_MIN_DATE: &str = "getMinDate";

const MAX_DATE_BODY: &str =
    r#"{"query": {"match_all": {}}, "sort": [{"date": {"order": "desc"}}], "_source": "date"}"#;
const MIN_DATE_BODY: &str =
    r#"{"query": {"match_all": {}}, "sort": [{"date": {"order": "asc"}}], "_source": "date"}"#;

/// Registry holding the mapping between query names and their bodies.
pub struct QueryRegistry {
    queries: DashMap<String, String>,
}

impl QueryRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a registry preloaded with the date-bound queries.
    pub fn with_defaults() -> Arc<Self> {
        let registry = Self::default();
        registry.register(QUERY_MAX_DATE, MAX_DATE_BODY);
        registry.register(QUERY_MIN_DATE, MIN_DATE_BODY);
        Arc::new(registry)
    }

    /// Registers (or replaces) a query body under `name`.
    pub fn register(&self, name: &str, body: impl Into<String>) {
        self.queries.insert(name.to_string(), body.into());
        tracing::info!("Registered query: {}", name);
    }

    /// Looks up the body registered under `name`.
    ///
    /// # Returns
    /// * `Err(Error::UnknownQuery)` if nothing is registered under that name.
    pub fn resolve(&self, name: &str) -> Result<String> {
        match self.queries.get(name) {
            Some(body) => Ok(body.value().clone()),
            None => {
                tracing::error!("Unknown query: {}", name);
                Err(Error::UnknownQuery(name.to_string()))
            }
        }
    }

    /// Returns the registered query names, sorted.
    pub fn list_queries(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .queries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn has_query(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }
}

impl Default for QueryRegistry {
    fn default() -> Self {
        Self {
            queries: DashMap::new(),
        }
    }
}
