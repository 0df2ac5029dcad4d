//! Ingestion Module
//!
//! Moves the daily dataset into the index and back out again.
//!
//! ## Workflow
//! 1. **Fetch**: Downloads the daily per-state series from the public API.
//! 2. **Watermark**: Asks the index for the latest date it already holds.
//! 3. **Filter**: Keeps only records dated after the watermark.
//! 4. **Insert**: Upserts each record under its content hash, counting failures per record.
//!
//! Range deletion runs the same filter-then-call shape in reverse: records of a batch whose
//! date falls inside an inclusive range are deleted one by one, best effort.

pub mod delete;
pub mod fetch;
pub mod sync;
pub mod types;

pub use delete::{delete_doc, delete_index, delete_range, in_date_range};
pub use fetch::fetch_daily;
pub use sync::{insert_batch, newer_than, resolve_watermark, sync_latest};
pub use types::{DeleteReport, Record, SyncReport};
