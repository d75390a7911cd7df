//! Search queries: what a player is looking for.

use serde::{Deserialize, Serialize};

/// Hard ceiling on results per search, whatever the query asks for.
pub const MAX_SEARCH_RESULTS: usize = 5000;

/// A transient, per-call description of the sessions to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionQuery {
    /// When set, only sessions tagged with this keyword match.
    pub keyword: Option<String>,

    /// When set, only lobby sessions match.
    pub lobby_only: bool,

    /// Maximum number of results. Clamped to [`MAX_SEARCH_RESULTS`].
    pub max_results: usize,
}

impl SessionQuery {
    /// A query matching every advertised session, up to the ceiling.
    pub fn all() -> Self {
        Self {
            keyword: None,
            lobby_only: false,
            max_results: MAX_SEARCH_RESULTS,
        }
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn lobby_only(mut self, lobby_only: bool) -> Self {
        self.lobby_only = lobby_only;
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// The effective result limit after clamping to the ceiling.
    pub fn clamped_limit(&self) -> usize {
        self.max_results.min(MAX_SEARCH_RESULTS)
    }
}

impl Default for SessionQuery {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_matches_everything() {
        let query = SessionQuery::default();
        assert!(query.keyword.is_none());
        assert!(!query.lobby_only);
        assert_eq!(query.max_results, MAX_SEARCH_RESULTS);
    }

    #[test]
    fn test_clamped_limit_caps_at_ceiling() {
        let query = SessionQuery::all().max_results(usize::MAX);
        assert_eq!(query.clamped_limit(), MAX_SEARCH_RESULTS);

        let query = SessionQuery::all().max_results(3);
        assert_eq!(query.clamped_limit(), 3);
    }
}
