//! Curation Module
//!
//! Prepares the raw daily series for dashboards: joins each record with its region's
//! population and derives the timestamp, per-capita and rate fields.
//!
//! ## Submodules
//! - **`population`**: Loads the region -> population reference from CSV.
//! - **`enrich`**: The join and the per-record derivations.

pub mod enrich;
pub mod population;

pub use enrich::{curate, enrich_record};
pub use population::PopulationReference;
