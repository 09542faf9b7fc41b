//! Picking the jemaat a scan will be attributed to.

use std::collections::HashMap;

use crate::api::{ApiError, JemaatSummary, KehadiranApi};

/// Queries shorter than this never reach the directory.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query too short; ask for more input instead of showing results.
    Prompt,
    Results(Vec<JemaatSummary>),
}

/// Directory search with a per-query cache and the current selection.
///
/// Each distinct query string hits the directory at most once for the
/// lifetime of the selector. Failed lookups are not cached.
#[derive(Debug, Default)]
pub struct IdentitySelector {
    cache: HashMap<String, Vec<JemaatSummary>>,
    selected: Option<JemaatSummary>,
}

impl IdentitySelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn search<A>(&mut self, api: &A, query: &str) -> Result<SearchOutcome, ApiError>
    where
        A: KehadiranApi + ?Sized,
    {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(SearchOutcome::Prompt);
        }

        if let Some(hit) = self.cache.get(query) {
            return Ok(SearchOutcome::Results(hit.clone()));
        }

        let results = api.search_jemaat(query).await?;
        self.cache.insert(query.to_owned(), results.clone());
        Ok(SearchOutcome::Results(results))
    }

    pub fn select(&mut self, jemaat: JemaatSummary) {
        tracing::debug!(jemaat_id = %jemaat.id, "jemaat selected");
        self.selected = Some(jemaat);
    }

    pub fn selected(&self) -> Option<&JemaatSummary> {
        self.selected.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
