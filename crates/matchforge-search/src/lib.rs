//! Deterministic session search for Matchforge.
//!
//! Filters the registry's live sessions against a [`SessionQuery`] and
//! returns an owned, ordered [`SearchResult`] snapshot. No side effects,
//! no retained state: identical registry contents and an identical query
//! always produce the identical ordered result.

mod engine;
mod query;

pub use engine::{SearchEngine, SearchResult};
pub use query::{SessionQuery, MAX_SEARCH_RESULTS};
