//! Deduplication of extracted PMIDs against identifiers already in the store.

use std::collections::HashSet;

/// Keep the candidates not present in `known`, preserving their order.
pub fn filter_new(candidates: &[String], known: &HashSet<String>) -> Vec<String> {
    candidates
        .iter()
        .filter(|id| !known.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Snapshot of identifiers already persisted in the literature sheet.
///
/// Loaded once at startup and grown after every successful batch write, so
/// later queries in the same run never re-fetch what earlier ones wrote.
#[derive(Debug, Clone, Default)]
pub struct KnownIdentifiers {
    ids: HashSet<String>,
}

impl KnownIdentifiers {
    pub fn new(ids: HashSet<String>) -> Self {
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Candidates not yet known, in input order
    pub fn filter_new(&self, candidates: &[String]) -> Vec<String> {
        filter_new(candidates, &self.ids)
    }

    /// Record identifiers that were just written to the store
    pub fn extend<I>(&mut self, written: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.ids.extend(written);
    }
}

impl FromIterator<String> for KnownIdentifiers {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
