use super::client::{DocumentStore, ScrollCursor, ScrollPage, SearchPage};
use crate::error::{Error, Result};
use crate::ingestion::types::Record;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};
use uuid::Uuid;

struct CursorState {
    remaining: VecDeque<Record>,
    page_size: usize,
    expires_at: Instant,
}

/// In-process document store.
///
/// Understands the subset of the query DSL the registered queries use: `match_all`,
/// `range` on one field, `sort` and `_source` filtering. Hits are returned in id order
/// unless the query sorts. Scroll contexts behave like the real store's: each cursor is
/// consumed by its continuation and expires once its window elapses. A context is released
/// as soon as it runs out of hits; expired ones are dropped whenever a new one opens.
pub struct InMemoryStore {
    indexes: DashMap<String, BTreeMap<String, Record>>,
    cursors: DashMap<String, CursorState>,
    writes: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            indexes: DashMap::new(),
            cursors: DashMap::new(),
            writes: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Seeds a document without counting it as a write.
    pub fn store_local(&self, index: &str, id: &str, record: Record) {
        self.indexes
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), record);
    }

    pub fn get_local(&self, index: &str, id: &str) -> Option<Record> {
        self.indexes
            .get(index)
            .and_then(|documents| documents.get(id).cloned())
    }

    pub fn local_entry_count(&self, index: &str) -> usize {
        self.indexes
            .get(index)
            .map(|documents| documents.len())
            .unwrap_or(0)
    }

    /// Number of successful upserts since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Number of successful single-document deletes since creation.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(AtomicOrdering::SeqCst)
    }

    pub fn open_cursor_count(&self) -> usize {
        self.cursors.len()
    }

    /// Registers a scroll context, first dropping every context whose window has elapsed.
    fn open_cursor(
        &self,
        remaining: VecDeque<Record>,
        page_size: usize,
        window: Duration,
    ) -> ScrollCursor {
        let now = Instant::now();
        self.cursors.retain(|_, state| state.expires_at > now);

        let token = Uuid::new_v4().to_string();
        self.cursors.insert(
            token.clone(),
            CursorState {
                remaining,
                page_size,
                expires_at: now + window,
            },
        );
        ScrollCursor::new(token)
    }

    /// A cursor for an exhausted context. Nothing is registered under it, so continuing
    /// it reports `CursorExpired`.
    fn closed_cursor() -> ScrollCursor {
        ScrollCursor::new(Uuid::new_v4().to_string())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.indexes.contains_key(index))
    }

    async fn search(
        &self,
        index: &str,
        body: &str,
        page_size: usize,
        window: Duration,
    ) -> Result<SearchPage> {
        if page_size == 0 {
            return Err(Error::validation("page size must be positive"));
        }
        let query: Value = serde_json::from_str(body)?;

        let mut matched: Vec<Record> = {
            let documents = self
                .indexes
                .get(index)
                .ok_or_else(|| Error::store(404, format!("no such index [{}]", index)))?;
            let predicate = compile_query(query.get("query"))?;
            documents
                .values()
                .filter(|record| predicate.matches(record))
                .cloned()
                .collect()
        };

        if let Some(sort) = query.get("sort") {
            let keys = compile_sort(sort)?;
            matched.sort_by(|a, b| compare_by_keys(a, b, &keys));
        }
        if let Some(source) = query.get("_source") {
            matched = matched
                .into_iter()
                .map(|record| project_source(record, source))
                .collect();
        }

        let total_hits = matched.len() as u64;
        let mut remaining: VecDeque<Record> = matched.into();
        let take = page_size.min(remaining.len());
        let first: Vec<Record> = remaining.drain(..take).collect();

        let cursor = if total_hits == 0 {
            Self::closed_cursor()
        } else {
            self.open_cursor(remaining, page_size, window)
        };

        Ok(SearchPage {
            cursor,
            total_hits,
            hits: first,
        })
    }

    async fn scroll_continue(
        &self,
        cursor: &ScrollCursor,
        window: Duration,
    ) -> Result<ScrollPage> {
        let (_, mut state) = self
            .cursors
            .remove(cursor.as_str())
            .ok_or(Error::CursorExpired)?;

        if Instant::now() >= state.expires_at {
            return Err(Error::CursorExpired);
        }

        let take = state.page_size.min(state.remaining.len());
        let hits: Vec<Record> = state.remaining.drain(..take).collect();

        let cursor = if hits.is_empty() {
            Self::closed_cursor()
        } else {
            self.open_cursor(state.remaining, state.page_size, window)
        };

        Ok(ScrollPage { cursor, hits })
    }

    async fn upsert(&self, index: &str, id: &str, body: &Record) -> Result<()> {
        if id.is_empty() {
            return Err(Error::store(400, "document id must not be empty"));
        }
        self.store_local(index, id, body.clone());
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn delete_by_id(&self, index: &str, id: &str) -> Result<()> {
        let mut documents = self
            .indexes
            .get_mut(index)
            .ok_or_else(|| Error::store(404, format!("no such index [{}]", index)))?;
        documents
            .remove(id)
            .ok_or_else(|| Error::store(404, format!("document [{}] not found", id)))?;
        self.deletes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        self.indexes
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| Error::store(404, format!("no such index [{}]", index)))
    }
}

enum Predicate {
    All,
    Range {
        field: String,
        gt: Option<f64>,
        gte: Option<f64>,
        lt: Option<f64>,
        lte: Option<f64>,
    },
}

impl Predicate {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Range {
                field,
                gt,
                gte,
                lt,
                lte,
            } => {
                let Some(value) = record.get(field).and_then(numeric) else {
                    return false;
                };
                gt.is_none_or(|bound| value > bound)
                    && gte.is_none_or(|bound| value >= bound)
                    && lt.is_none_or(|bound| value < bound)
                    && lte.is_none_or(|bound| value <= bound)
            }
        }
    }
}

fn compile_query(query: Option<&Value>) -> Result<Predicate> {
    let Some(query) = query else {
        return Ok(Predicate::All);
    };
    if query.get("match_all").is_some() {
        return Ok(Predicate::All);
    }
    if let Some(Value::Object(range)) = query.get("range")
        && let Some((field, bounds)) = range.iter().next()
    {
        let bound = |name: &str| bounds.get(name).and_then(numeric);
        return Ok(Predicate::Range {
            field: field.clone(),
            gt: bound("gt"),
            gte: bound("gte"),
            lt: bound("lt"),
            lte: bound("lte"),
        });
    }
    Err(Error::validation(format!("unsupported query clause: {}", query)))
}

fn compile_sort(sort: &Value) -> Result<Vec<(String, bool)>> {
    let clauses = match sort {
        Value::Array(clauses) => clauses.clone(),
        other => vec![other.clone()],
    };

    let mut keys = Vec::new();
    for clause in clauses {
        match clause {
            Value::String(field) => keys.push((field, false)),
            Value::Object(map) => {
                for (field, spec) in map {
                    let order = spec
                        .get("order")
                        .and_then(Value::as_str)
                        .or_else(|| spec.as_str())
                        .unwrap_or("asc");
                    keys.push((field, order.eq_ignore_ascii_case("desc")));
                }
            }
            other => {
                return Err(Error::validation(format!("unsupported sort clause: {}", other)));
            }
        }
    }
    Ok(keys)
}

fn compare_by_keys(a: &Record, b: &Record, keys: &[(String, bool)]) -> Ordering {
    for (field, descending) in keys {
        let ordering = match (a.get(field), b.get(field)) {
            (Some(left), Some(right)) => {
                let ordering = compare_values(left, right);
                if *descending { ordering.reverse() } else { ordering }
            }
            // Documents missing the sort field go last in either direction.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (numeric(left), numeric(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.to_string().cmp(&right.to_string()),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn project_source(record: Record, source: &Value) -> Record {
    let fields: Vec<&str> = match source {
        Value::String(field) => vec![field.as_str()],
        Value::Array(fields) => fields.iter().filter_map(Value::as_str).collect(),
        Value::Bool(false) => Vec::new(),
        _ => return record,
    };

    let mut projected = Record::new();
    for field in fields {
        if let Some(value) = record.get(field) {
            projected.insert(field, value.clone());
        }
    }
    projected
}
