//! Cascading reference detector: an ordered chain of detectors

use super::detector::ReferenceDetector;
use super::identity_name::IdentityNameReferenceDetector;
use crate::graph::NodeAddress;

/// Tries each detector in construction order; the first match wins.
///
/// The sequence is fixed at construction. A detector is not consulted once
/// an earlier one has produced a match, and a reference nobody resolves
/// yields `None`.
pub struct CascadingReferenceDetector {
    detectors: Vec<Box<dyn ReferenceDetector>>,
}

impl CascadingReferenceDetector {
    pub fn new(detectors: Vec<Box<dyn ReferenceDetector>>) -> Self {
        Self { detectors }
    }

    /// Build the cascade used for one aggregation run: every plugin-supplied
    /// detector in order, then the identity-name fallback last, so plugin
    /// resolution always takes precedence over name matching.
    pub fn with_fallback(
        plugin_detectors: Vec<Box<dyn ReferenceDetector>>,
        fallback: IdentityNameReferenceDetector,
    ) -> Self {
        let mut detectors = plugin_detectors;
        detectors.push(Box::new(fallback));
        Self::new(detectors)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl ReferenceDetector for CascadingReferenceDetector {
    fn resolve(&self, reference: &str) -> Option<NodeAddress> {
        self.detectors.iter().find_map(|d| d.resolve(reference))
    }
}
