use super::types::{DEFAULT_START_DATE, Record, SyncReport};
use crate::error::Result;
use crate::query::{QUERY_MAX_DATE, QueryRegistry, ResultCap, ScrollOptions, run_query};
use crate::store::DocumentStore;

/// Finds the latest date already stored in `index`.
///
/// Falls back to [`DEFAULT_START_DATE`] when the index does not exist yet or holds no
/// dated documents.
pub async fn resolve_watermark(
    store: &dyn DocumentStore,
    registry: &QueryRegistry,
    index: &str,
    options: &ScrollOptions,
) -> Result<i64> {
    if !store.index_exists(index).await? {
        tracing::info!("Index '{}' not found, starting from {}", index, DEFAULT_START_DATE);
        return Ok(DEFAULT_START_DATE);
    }

    let options = options.clone().with_cap(ResultCap::Limit(1));
    let latest = run_query(store, registry, index, QUERY_MAX_DATE, &options).await?;
    let watermark = latest
        .first()
        .and_then(Record::date)
        .unwrap_or(DEFAULT_START_DATE);

    tracing::info!("startDate: {}", watermark);
    Ok(watermark)
}

/// Keeps the records dated strictly after `watermark`, in batch order.
pub fn newer_than(batch: &[Record], watermark: i64) -> Vec<&Record> {
    batch
        .iter()
        .filter(|record| match record.date() {
            Some(date) => date > watermark,
            None => {
                tracing::warn!("Skipping record without a readable date: {:?}", record.hash());
                false
            }
        })
        .collect()
}

/// Upserts each record under its hash, one call at a time.
///
/// A failing record is logged and counted; it never stops the rest of the batch.
pub async fn insert_batch(
    store: &dyn DocumentStore,
    index: &str,
    records: &[&Record],
) -> SyncReport {
    let mut report = SyncReport {
        attempted: records.len(),
        ..SyncReport::default()
    };

    for record in records {
        let Some(hash) = record.hash() else {
            tracing::error!("Record dated {:?} has no hash, cannot index it", record.date());
            report.failed += 1;
            continue;
        };

        match store.upsert(index, hash, record).await {
            Ok(()) => {
                report.inserted += 1;
                tracing::debug!("importing: {}", report.inserted);
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!("Failed to index document {}: {}", hash, e);
            }
        }
    }

    tracing::info!(
        "records attempted: {}, records imported: {}, records failed: {}",
        report.attempted,
        report.inserted,
        report.failed
    );
    report
}

/// Inserts only the part of `batch` newer than what `index` already holds.
///
/// Running it twice with the same batch is a no-op the second time: the first run moves
/// the watermark past every inserted date.
pub async fn sync_latest(
    store: &dyn DocumentStore,
    registry: &QueryRegistry,
    index: &str,
    batch: &[Record],
    options: &ScrollOptions,
) -> Result<SyncReport> {
    let watermark = resolve_watermark(store, registry, index, options).await?;
    let fresh = newer_than(batch, watermark);

    tracing::info!(
        "{} of {} incoming records are newer than {}",
        fresh.len(),
        batch.len(),
        watermark
    );

    let report = insert_batch(store, index, &fresh).await;
    Ok(SyncReport {
        watermark,
        ..report
    })
}
