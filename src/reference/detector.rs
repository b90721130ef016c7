//! ReferenceDetector trait and the table-backed detector

use crate::graph::NodeAddress;
use std::collections::HashMap;

/// Resolves a textual reference (a URL, a handle) to a canonical node address.
///
/// Implementations are pure lookups: no interior mutation, no side effects,
/// and the same reference always yields the same result.
pub trait ReferenceDetector: Send + Sync {
    fn resolve(&self, reference: &str) -> Option<NodeAddress>;
}

/// A detector backed by a precomputed `reference -> address` table.
///
/// Matching is exact.
#[derive(Debug, Clone, Default)]
pub struct MappedReferenceDetector {
    table: HashMap<String, NodeAddress>,
}

impl MappedReferenceDetector {
    pub fn new(table: HashMap<String, NodeAddress>) -> Self {
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl FromIterator<(String, NodeAddress)> for MappedReferenceDetector {
    fn from_iter<I: IntoIterator<Item = (String, NodeAddress)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ReferenceDetector for MappedReferenceDetector {
    fn resolve(&self, reference: &str) -> Option<NodeAddress> {
        self.table.get(reference).cloned()
    }
}
