//! Fallback detector matching "@name" references against ledger identities

use super::detector::ReferenceDetector;
use crate::graph::NodeAddress;
use crate::ledger::Ledger;
use std::collections::HashMap;

/// Resolves bare username references such as `@alice` or `alice` to the
/// matching identity's address.
///
/// Supports legacy content that names participants instead of addressing
/// them. Names are renameable, so this is the lowest-priority detector.
///
/// The name table is a snapshot taken at construction: identities added to
/// the ledger afterwards (including by the aggregation run that built this
/// detector) are not visible to it.
#[derive(Debug, Clone, Default)]
pub struct IdentityNameReferenceDetector {
    name_to_address: HashMap<String, NodeAddress>,
}

impl IdentityNameReferenceDetector {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let name_to_address = ledger
            .accounts()
            .map(|a| (a.identity.name.key(), a.identity.address.clone()))
            .collect();
        Self { name_to_address }
    }
}

impl ReferenceDetector for IdentityNameReferenceDetector {
    fn resolve(&self, reference: &str) -> Option<NodeAddress> {
        let name = reference.strip_prefix('@').unwrap_or(reference);
        self.name_to_address.get(&name.to_lowercase()).cloned()
    }
}
