//! Scroll Query Module
//!
//! Runs named queries against the document store to completion.
//!
//! ## Overview
//! A query is looked up by name in the `QueryRegistry`, executed as a scrolled search, and
//! paged through with single-use cursors until the store reports no more hits. The result
//! set is accumulated locally and truncated to the requested return size.
//!
//! ## Submodules
//! - **`registry`**: Name -> query body mapping, preloaded with the date-bound queries.
//! - **`scroll`**: The paging loop.
//! - **`types`**: `ResultCap` and `ScrollOptions`.

pub mod registry;
pub mod scroll;
pub mod types;

pub use registry::{QUERY_MAX_DATE, QUERY_MIN_DATE, QueryRegistry};
pub use scroll::run_query;
pub use types::{ResultCap, ScrollOptions};
