use super::registry::QueryRegistry;
use super::types::ScrollOptions;
use crate::error::{Error, Result};
use crate::ingestion::types::Record;
use crate::store::DocumentStore;

/// Runs the query registered as `query_name` against `index` to completion.
///
/// Issues the initial search, then keeps continuing with the most recently issued cursor
/// until a continuation comes back empty. Each continuation replaces the cursor; an old
/// one is never sent twice. The accumulated hits are truncated to `options.cap` at the end.
///
/// # Errors
/// * `Error::UnknownQuery` before any store call if the name is not registered.
/// * `Error::CursorExpired` if the store released the context between pages. The partial
///   result set is discarded rather than returned as if complete.
pub async fn run_query(
    store: &dyn DocumentStore,
    registry: &QueryRegistry,
    index: &str,
    query_name: &str,
    options: &ScrollOptions,
) -> Result<Vec<Record>> {
    let body = registry.resolve(query_name)?;
    if options.page_size == 0 {
        return Err(Error::validation("page size must be positive"));
    }

    let first = store
        .search(index, &body, options.page_size, options.window)
        .await?;
    let total_hits = first.total_hits;
    let mut cursor = first.cursor;
    let mut results = first.hits;

    tracing::debug!(
        "Query '{}' on '{}': {} total hits, first page {}",
        query_name,
        index,
        total_hits,
        results.len()
    );

    if total_hits > 0 {
        loop {
            let page = store.scroll_continue(&cursor, options.window).await?;
            cursor = page.cursor;
            if page.hits.is_empty() {
                break;
            }
            tracing::debug!("Scrolled {} more hits (cursor {})", page.hits.len(), cursor);
            results.extend(page.hits);
        }
    }

    let results = options.cap.apply(results);
    tracing::info!(
        "Query '{}' returned {} records (return size {})",
        query_name,
        results.len(),
        options.cap
    );
    Ok(results)
}
