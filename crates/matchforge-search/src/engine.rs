//! The search engine: filters registry snapshots against a query.

use matchforge_registry::{SessionRecord, SessionRegistry};
use serde::{Deserialize, Serialize};

use crate::SessionQuery;

// ---------------------------------------------------------------------------
// SearchResult
// ---------------------------------------------------------------------------

/// An owned, ordered snapshot of the sessions matching a query.
///
/// Results are ranked by registry insertion order — the oldest matching
/// session first. With no other ranking signal this is the deterministic
/// tie-break, which keeps searches reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    records: Vec<SessionRecord>,
}

impl SearchResult {
    /// The best-ranked match, if any.
    pub fn first(&self) -> Option<&SessionRecord> {
        self.records.first()
    }

    /// All matches, in rank order.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SessionRecord> {
        self.records.iter()
    }
}

impl IntoIterator for SearchResult {
    type Item = SessionRecord;
    type IntoIter = std::vec::IntoIter<SessionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// Filters the registry's live sessions against a [`SessionQuery`].
///
/// Stateless — it reads a snapshot per call and retains nothing, so a
/// result can never mutate under the caller's feet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine;

impl SearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Runs a query against the registry's current contents.
    ///
    /// A record matches when all of these hold:
    /// - it is advertised (unlisted sessions are never returned)
    /// - the query keyword, when present, is in the record's tag set
    /// - the record is a lobby, when the query asks for lobbies only
    ///
    /// The result is truncated to the query's clamped limit.
    pub fn search(
        &self,
        registry: &SessionRegistry,
        query: &SessionQuery,
    ) -> SearchResult {
        let records: Vec<SessionRecord> = registry
            .all_active()
            .into_iter()
            .filter(|r| r.advertised)
            .filter(|r| match &query.keyword {
                Some(keyword) => r.has_tag(keyword),
                None => true,
            })
            .filter(|r| !query.lobby_only || r.lobby)
            .take(query.clamped_limit())
            .collect();

        tracing::debug!(
            matches = records.len(),
            keyword = query.keyword.as_deref().unwrap_or(""),
            lobby_only = query.lobby_only,
            "search complete"
        );

        SearchResult { records }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use matchforge_identity::PlayerIdentity;
    use matchforge_registry::SessionParams;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn host(n: u32) -> PlayerIdentity {
        PlayerIdentity::new(format!("acct-{n}"), format!("Player {n}"))
    }

    /// A registry with three sessions: two arena lobbies and one
    /// unlisted scrim, inserted in that order.
    fn populated_registry() -> SessionRegistry {
        let mut reg = SessionRegistry::new();
        reg.create(SessionParams::new("Arena-1").tag("arena"), host(1))
            .unwrap();
        reg.create(
            SessionParams::new("Arena-2").tag("arena").lobby(false),
            host(2),
        )
        .unwrap();
        reg.create(
            SessionParams::new("Scrim").tag("scrim").advertised(false),
            host(3),
        )
        .unwrap();
        reg
    }

    fn names(result: &SearchResult) -> Vec<String> {
        result
            .iter()
            .map(|r| r.name.as_str().to_string())
            .collect()
    }

    // =====================================================================
    // search()
    // =====================================================================

    #[test]
    fn test_search_keyword_filters_by_tag() {
        let reg = populated_registry();

        let result =
            SearchEngine::new().search(&reg, &SessionQuery::all().keyword("arena"));

        assert_eq!(names(&result), vec!["Arena-1", "Arena-2"]);
    }

    #[test]
    fn test_search_unknown_keyword_returns_empty() {
        let reg = populated_registry();

        let result = SearchEngine::new()
            .search(&reg, &SessionQuery::all().keyword("ranked"));

        assert!(result.is_empty());
    }

    #[test]
    fn test_search_lobby_only_excludes_non_lobbies() {
        let reg = populated_registry();

        let result = SearchEngine::new()
            .search(&reg, &SessionQuery::all().lobby_only(true));

        assert_eq!(names(&result), vec!["Arena-1"]);
    }

    #[test]
    fn test_search_never_returns_unlisted_sessions() {
        let reg = populated_registry();

        let result = SearchEngine::new()
            .search(&reg, &SessionQuery::all().keyword("scrim"));

        assert!(
            result.is_empty(),
            "unadvertised sessions must be invisible to search"
        );
    }

    #[test]
    fn test_search_truncates_to_max_results() {
        let mut reg = SessionRegistry::new();
        for n in 0..10 {
            reg.create(SessionParams::new(format!("S{n}")), host(n))
                .unwrap();
        }

        let result = SearchEngine::new()
            .search(&reg, &SessionQuery::all().max_results(3));

        assert_eq!(result.len(), 3);
        // Truncation keeps the best-ranked (oldest) sessions.
        assert_eq!(names(&result), vec!["S0", "S1", "S2"]);
    }

    #[test]
    fn test_search_empty_registry_returns_empty() {
        let reg = SessionRegistry::new();

        let result = SearchEngine::new().search(&reg, &SessionQuery::all());

        assert!(result.is_empty());
        assert!(result.first().is_none());
    }

    #[test]
    fn test_search_is_deterministic() {
        let reg = populated_registry();
        let query = SessionQuery::all().keyword("arena").lobby_only(false);
        let engine = SearchEngine::new();

        let first = engine.search(&reg, &query);
        let second = engine.search(&reg, &query);

        assert_eq!(first, second, "identical state + query ⇒ identical result");
    }

    #[test]
    fn test_search_ranks_by_insertion_order() {
        let mut reg = SessionRegistry::new();
        reg.create(SessionParams::new("Zulu").tag("arena"), host(1))
            .unwrap();
        reg.create(SessionParams::new("Alpha").tag("arena"), host(2))
            .unwrap();

        let result =
            SearchEngine::new().search(&reg, &SessionQuery::all().keyword("arena"));

        // Insertion order, not alphabetical.
        assert_eq!(names(&result), vec!["Zulu", "Alpha"]);
        assert_eq!(result.first().unwrap().name.as_str(), "Zulu");
    }
}
