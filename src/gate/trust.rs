//! Source trust lookup.

use std::collections::HashSet;

/// Trust lookup for request origins.
///
/// Implementations must be cheap: the gate calls this inline on the request
/// path and expects an in-memory (or cached) answer.
pub trait TrustRegistry: Send + Sync {
    /// Whether requests from this source are allowed through the gate.
    fn is_trusted(&self, source_id: &str) -> bool;
}

/// Fixed, in-memory trust registry over a set of source ids.
#[derive(Debug, Clone, Default)]
pub struct StaticTrustRegistry {
    sources: HashSet<String>,
}

impl StaticTrustRegistry {
    /// Build a registry from an iterator of trusted source ids.
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a trusted source.
    pub fn allow(&mut self, source_id: impl Into<String>) {
        self.sources.insert(source_id.into());
    }
}

impl TrustRegistry for StaticTrustRegistry {
    fn is_trusted(&self, source_id: &str) -> bool {
        self.sources.contains(source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_registry() {
        let mut registry = StaticTrustRegistry::new(["mcp1.local"]);
        assert!(registry.is_trusted("mcp1.local"));
        assert!(!registry.is_trusted("rogue-node"));

        registry.allow("mcp2.local");
        assert!(registry.is_trusted("mcp2.local"));
    }

    #[test]
    fn test_empty_registry_trusts_nothing() {
        let registry = StaticTrustRegistry::default();
        assert!(!registry.is_trusted("anything"));
    }
}
