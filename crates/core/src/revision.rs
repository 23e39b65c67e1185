//! Optimistic concurrency expectations for stored documents.

/// Revision a writer expects a document to be at when its transaction commits.
///
/// Revisions start at 1 on creation and increase by one per committed write.
/// An absent document has no revision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedRevision {
    /// Skip checking (blind write).
    Any,
    /// The document must not exist yet.
    Missing,
    /// The document must exist at exactly this revision.
    Exact(u64),
}

impl ExpectedRevision {
    /// Expectation recorded after observing `current` during a read.
    pub fn observed(current: Option<u64>) -> Self {
        match current {
            Some(rev) => ExpectedRevision::Exact(rev),
            None => ExpectedRevision::Missing,
        }
    }

    pub fn matches(self, current: Option<u64>) -> bool {
        match (self, current) {
            (ExpectedRevision::Any, _) => true,
            (ExpectedRevision::Missing, None) => true,
            (ExpectedRevision::Exact(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_absence_requires_absence() {
        let exp = ExpectedRevision::observed(None);
        assert!(exp.matches(None));
        assert!(!exp.matches(Some(1)));
    }

    #[test]
    fn exact_rejects_a_newer_revision() {
        let exp = ExpectedRevision::observed(Some(3));
        assert!(exp.matches(Some(3)));
        assert!(!exp.matches(Some(4)));
        assert!(!exp.matches(None));
    }
}
