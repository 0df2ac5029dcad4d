use super::types::{DeleteReport, Record};
use crate::error::Result;
use crate::store::DocumentStore;

/// Keeps the records with `from <= date <= to`. A missing bound is open on that side.
///
/// With neither bound every record is kept, dated or not.
pub fn in_date_range(batch: &[Record], from: Option<i64>, to: Option<i64>) -> Vec<&Record> {
    if from.is_none() && to.is_none() {
        return batch.iter().collect();
    }
    batch
        .iter()
        .filter(|record| {
            record.date().is_some_and(|date| {
                from.is_none_or(|from| from <= date) && to.is_none_or(|to| date <= to)
            })
        })
        .collect()
}

/// Deletes every record of `batch` dated within `[from, to]`, one call per record.
///
/// Deletes are best effort: a missing document or a failed call is logged and counted,
/// and the remaining deletes still go out.
pub async fn delete_range(
    store: &dyn DocumentStore,
    index: &str,
    batch: &[Record],
    from: Option<i64>,
    to: Option<i64>,
) -> DeleteReport {
    let targets = in_date_range(batch, from, to);
    let mut report = DeleteReport {
        attempted: targets.len(),
        ..DeleteReport::default()
    };

    for record in targets {
        let Some(hash) = record.hash() else {
            tracing::warn!("Record dated {:?} has no hash, nothing to delete", record.date());
            report.failed += 1;
            continue;
        };
        if delete_doc(store, index, hash).await {
            report.deleted += 1;
        } else {
            report.failed += 1;
        }
    }

    tracing::info!(
        "Deleted {} of {} documents between {:?} and {:?}",
        report.deleted,
        report.attempted,
        from,
        to
    );
    report
}

/// Deletes a single document. Failures are logged, never raised.
pub async fn delete_doc(store: &dyn DocumentStore, index: &str, doc_id: &str) -> bool {
    match store.delete_by_id(index, doc_id).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to delete document {}: {}", doc_id, e);
            false
        }
    }
}

/// Deletes `index` if it exists. Returns whether anything was deleted.
pub async fn delete_index(store: &dyn DocumentStore, index: &str) -> Result<bool> {
    if !store.index_exists(index).await? {
        tracing::info!("{} not found", index);
        return Ok(false);
    }
    store.delete_index(index).await?;
    tracing::info!("The {} index has been deleted", index);
    Ok(true)
}
