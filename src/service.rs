//! Index Service
//!
//! The action surface of the tool (`insertLatest`, `deleteIndex`, `deleteDoc`, `deleteDocs`,
//! `query`, `export`, `curate`) bound to one store, one query registry and one config.
//! Both the CLI and the HTTP API go through here, so parameter validation lives in one
//! place and always runs before any store or file I/O.

use crate::config::Config;
use crate::curation::{PopulationReference, curate};
use crate::error::{Error, Result};
use crate::export::{ExportRequest, ExportSummary, ExportTarget, export};
use crate::ingestion::types::parse_optional_date;
use crate::ingestion::{self, DeleteReport, Record, SyncReport};
use crate::query::{QueryRegistry, ResultCap, ScrollOptions, run_query};
use crate::store::DocumentStore;

use std::sync::Arc;

/// File name the curate action exports to.
pub const CURATED_EXPORT_NAME: &str = "currentCovid";
/// Earliest date included in the curated export.
pub const CURATED_FROM_DATE: &str = "20200101";

pub struct IndexService {
    store: Arc<dyn DocumentStore>,
    registry: Arc<QueryRegistry>,
    config: Config,
}

impl IndexService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        registry: Arc<QueryRegistry>,
        config: Config,
    ) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &QueryRegistry {
        &self.registry
    }

    fn scroll_options(&self) -> ScrollOptions {
        ScrollOptions {
            window: self.config.scroll_window,
            page_size: self.config.page_size,
            cap: ResultCap::All,
        }
    }

    /// Downloads the current daily dataset.
    pub async fn fetch_dataset(&self) -> Result<Vec<Record>> {
        ingestion::fetch_daily(&self.config.dataset_url).await
    }

    /// Inserts the records of `batch` newer than anything already indexed.
    pub async fn insert_latest(&self, batch: &[Record]) -> Result<SyncReport> {
        ingestion::sync_latest(
            self.store.as_ref(),
            &self.registry,
            &self.config.index,
            batch,
            &self.scroll_options(),
        )
        .await
    }

    pub async fn delete_index(&self) -> Result<bool> {
        ingestion::delete_index(self.store.as_ref(), &self.config.index).await
    }

    /// Deletes one document. Returns whether the store confirmed the delete.
    pub async fn delete_doc(&self, doc_id: &str) -> Result<bool> {
        let doc_id = doc_id.trim();
        if doc_id.is_empty() {
            return Err(Error::validation("doc_id param cannot be blank"));
        }
        Ok(ingestion::delete_doc(self.store.as_ref(), &self.config.index, doc_id).await)
    }

    /// Deletes the records of `batch` dated within `[from, to]`; no bounds deletes them all.
    pub async fn delete_docs(
        &self,
        batch: &[Record],
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<DeleteReport> {
        let (from, to) = parse_range(from, to)?;
        let report =
            ingestion::delete_range(self.store.as_ref(), &self.config.index, batch, from, to)
                .await;
        Ok(report)
    }

    /// Same as [`IndexService::delete_docs`], over a freshly fetched dataset.
    pub async fn delete_docs_latest(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<DeleteReport> {
        let (from, to) = parse_range(from, to)?;
        let batch = self.fetch_dataset().await?;
        let report =
            ingestion::delete_range(self.store.as_ref(), &self.config.index, &batch, from, to)
                .await;
        Ok(report)
    }

    /// Runs a registered query; `return_size` is `"all"` (default) or a positive count.
    pub async fn query(
        &self,
        query_name: &str,
        return_size: Option<&str>,
    ) -> Result<Vec<Record>> {
        if query_name.trim().is_empty() {
            return Err(Error::validation("query param cannot be blank"));
        }
        let cap = match return_size {
            Some(raw) => raw.parse::<ResultCap>()?,
            None => ResultCap::All,
        };

        run_query(
            self.store.as_ref(),
            &self.registry,
            &self.config.index,
            query_name,
            &self.scroll_options().with_cap(cap),
        )
        .await
    }

    pub fn export(&self, batch: &[Record], request: &ExportRequest) -> Result<ExportSummary> {
        export(batch, request, &self.config.export_dir)
    }

    pub async fn export_latest(&self, request: &ExportRequest) -> Result<ExportSummary> {
        parse_optional_date(request.from_date.as_deref())?;
        let batch = self.fetch_dataset().await?;
        self.export(&batch, request)
    }

    /// Enriches `batch` with population figures and exports it as an ES array.
    pub fn curate(&self, batch: Vec<Record>) -> Result<ExportSummary> {
        let population = PopulationReference::from_csv_path(&self.config.population_csv)?;
        self.curate_with(batch, &population)
    }

    pub async fn curate_latest(&self) -> Result<ExportSummary> {
        let population = PopulationReference::from_csv_path(&self.config.population_csv)?;
        let batch = self.fetch_dataset().await?;
        self.curate_with(batch, &population)
    }

    pub fn curate_with(
        &self,
        batch: Vec<Record>,
        population: &PopulationReference,
    ) -> Result<ExportSummary> {
        let curated = curate(batch, population);
        let request = ExportRequest::new(ExportTarget::Elastic)
            .with_path(CURATED_EXPORT_NAME)
            .with_from_date(CURATED_FROM_DATE);
        self.export(&curated, &request)
    }
}

fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<(Option<i64>, Option<i64>)> {
    let from = parse_optional_date(from)?;
    let to = parse_optional_date(to)?;
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(Error::validation(format!(
            "cannot determine date range between {} and {}",
            from, to
        )));
    }
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use serde_json::{Value, json};

    fn service(store: Arc<InMemoryStore>, export_dir: &std::path::Path) -> IndexService {
        let config = Config {
            export_dir: export_dir.to_path_buf(),
            ..Config::default()
        };
        IndexService::new(store, QueryRegistry::with_defaults(), config)
    }

    fn batch() -> Vec<Record> {
        (1..=5)
            .map(|day| {
                let state = if day % 2 == 0 { "WA" } else { "NY" };
                Record::try_from(json!({
                    "date": 20200300 + day,
                    "state": state,
                    "hash": format!("h{}", day),
                    "death": day,
                    "positive": day * 100
                }))
                .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_insert_then_query_max_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone(), dir.path());

        let report = service.insert_latest(&batch()).await.unwrap();
        assert_eq!(report.inserted, 5);

        let latest = service.query("getMaxDate", Some("1")).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].date(), Some(20200305));
    }

    #[tokio::test]
    async fn test_query_validation() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(InMemoryStore::new()), dir.path());

        assert!(matches!(service.query(" ", None).await, Err(Error::Validation(_))));
        assert!(matches!(
            service.query("getMaxDate", Some("zero")).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            service.query("atHocQuery", None).await,
            Err(Error::UnknownQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_docs_validates_before_deleting() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone(), dir.path());
        service.insert_latest(&batch()).await.unwrap();

        let bad = service.delete_docs(&batch(), Some("2020-03-01"), None).await;
        assert!(matches!(bad, Err(Error::Validation(_))));
        let inverted = service
            .delete_docs(&batch(), Some("20200305"), Some("20200301"))
            .await;
        assert!(matches!(inverted, Err(Error::Validation(_))));
        assert_eq!(store.delete_count(), 0);

        let report = service
            .delete_docs(&batch(), Some("20200302"), Some("20200304"))
            .await
            .unwrap();
        assert_eq!(report.deleted, 3);
        assert_eq!(store.local_entry_count("covid-19"), 2);
    }

    #[tokio::test]
    async fn test_delete_doc_requires_id() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(InMemoryStore::new()), dir.path());

        assert!(matches!(service.delete_doc("").await, Err(Error::Validation(_))));
        assert!(!service.delete_doc("missing").await.unwrap());
    }

    #[test]
    fn test_curate_exports_enriched_array() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(InMemoryStore::new()), dir.path());
        let population: PopulationReference = [("NY", 1_000_000i64)].into_iter().collect();

        let summary = service.curate_with(batch(), &population).unwrap();

        assert_eq!(summary.path, dir.path().join("currentCovid.json"));
        assert_eq!(summary.record_count, 3, "only NY records join");
        let documents: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&summary.path).unwrap()).unwrap();
        assert!(documents.iter().all(|doc| doc["mortalityRate"].is_number()));
        assert_eq!(documents[0]["dateTrack"], json!("2020-03-01T12:00:00Z"));
    }

    #[test]
    fn test_curate_missing_population_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            export_dir: dir.path().to_path_buf(),
            population_csv: dir.path().join("missing.csv"),
            ..Config::default()
        };
        let service = IndexService::new(
            Arc::new(InMemoryStore::new()),
            QueryRegistry::with_defaults(),
            config,
        );

        assert!(matches!(service.curate(batch()), Err(Error::Io(_))));
    }
}
