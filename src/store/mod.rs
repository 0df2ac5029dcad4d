//! Document Store Module
//!
//! The narrow client surface the index tooling consumes, plus two implementations.
//!
//! ## Core Concepts
//! - **DocumentStore**: index existence checks, scrolled search, upsert-by-id and deletes.
//!   Every call is a suspension point; callers issue them strictly one at a time.
//! - **ElasticClient**: speaks the Elasticsearch REST API over HTTP.
//! - **InMemoryStore**: an in-process store with real scroll-cursor semantics, used for
//!   local runs and as the test double.
//! - **ScrollCursor**: an immutable, single-use token. Each continuation returns the next one.

pub mod client;
pub mod elastic;
pub mod memory;
pub mod protocol;

pub use client::{DocumentStore, ScrollCursor, ScrollPage, SearchPage};
pub use elastic::ElasticClient;
pub use memory::InMemoryStore;

#[cfg(test)]
mod tests;
