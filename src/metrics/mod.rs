//! Risk-metric extraction.
//!
//! Each metric is a pure function from request text to a normalized score in
//! [0, 1]. Metrics are independent of one another, so they are individually
//! testable and safe to fan out. Extraction never fails: degenerate input
//! yields zero scores, and a misbehaving metric is isolated and treated as a
//! zero score rather than poisoning the rest of the vote.

mod glyphs;
mod pliny;
mod tool_drift;

pub use glyphs::RogueGlyphs;
pub use pliny::PlinyScore;
pub use tool_drift::ToolDrift;

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::Request;

/// A named set of normalized risk scores for one request.
///
/// Immutable once produced; values are clamped to [0, 1] on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: BTreeMap<String, f64>,
}

impl MetricSet {
    /// Empty metric set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score, clamping it to [0, 1]. NaN degrades to zero.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value };
        self.values.insert(name.into(), value.clamp(0.0, 1.0));
    }

    /// Look up a score by metric name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Iterate `(name, score)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of metrics present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// One heuristic risk signal.
///
/// `score` must be pure and total over all text, returning a value in
/// [0, 1]; out-of-range values are clamped by the registry.
pub trait Metric: Send + Sync {
    /// Stable metric name, used as the key in `MetricSet` and voter config.
    fn name(&self) -> &'static str;

    /// Score the request text.
    fn score(&self, request: &Request) -> f64;
}

/// Record of a metric that panicked during extraction.
#[derive(Debug, Clone, Serialize)]
pub struct MetricFailure {
    /// Name of the failing metric.
    pub metric: String,
    /// Request being scored when it failed.
    pub request_id: Uuid,
    /// Panic payload, best-effort.
    pub detail: String,
}

/// Ordered collection of metrics, run together per request.
///
/// The vocabulary is open: registering a new metric requires no change to
/// the voter unless a weight is configured for it.
#[derive(Default)]
pub struct MetricRegistry {
    metrics: Vec<Box<dyn Metric>>,
}

impl MetricRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in metrics.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PlinyScore::new()));
        registry.register(Box::new(RogueGlyphs));
        registry.register(Box::new(ToolDrift::default()));
        registry
    }

    /// Add a metric.
    pub fn register(&mut self, metric: Box<dyn Metric>) {
        self.metrics.push(metric);
    }

    /// Registered metric names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    /// Score the request with every registered metric.
    ///
    /// A panicking metric contributes 0.0 and is reported in the failure
    /// list; the remaining metrics still run.
    pub fn extract(&self, request: &Request) -> (MetricSet, Vec<MetricFailure>) {
        let mut set = MetricSet::new();
        let mut failures = Vec::new();

        for metric in &self.metrics {
            match catch_unwind(AssertUnwindSafe(|| metric.score(request))) {
                Ok(value) => set.insert(metric.name(), value),
                Err(payload) => {
                    let detail = panic_detail(payload.as_ref());
                    tracing::warn!(
                        metric = metric.name(),
                        request_id = %request.id,
                        detail = %detail,
                        "metric panicked; scoring as zero"
                    );
                    failures.push(MetricFailure {
                        metric: metric.name().to_string(),
                        request_id: request.id,
                        detail,
                    });
                    set.insert(metric.name(), 0.0);
                }
            }
        }

        (set, failures)
    }
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FaultyMetric;

    impl Metric for FaultyMetric {
        fn name(&self) -> &'static str {
            "faulty"
        }

        fn score(&self, _request: &Request) -> f64 {
            panic!("intentional test failure")
        }
    }

    struct ConstMetric(f64);

    impl Metric for ConstMetric {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn score(&self, _request: &Request) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_metric_set_clamps() {
        let mut set = MetricSet::new();
        set.insert("a", 1.7);
        set.insert("b", -0.3);
        set.insert("c", f64::NAN);
        assert_eq!(set.get("a"), Some(1.0));
        assert_eq!(set.get("b"), Some(0.0));
        assert_eq!(set.get("c"), Some(0.0));
    }

    #[test]
    fn test_empty_text_scores_zero_everywhere() {
        let registry = MetricRegistry::with_defaults();
        let request = Request::new("mcp1.local", "");
        let (set, failures) = registry.extract(&request);
        assert!(failures.is_empty());
        for (_, score) in set.iter() {
            assert_eq!(score, 0.0);
        }
    }

    #[test]
    fn test_panicking_metric_is_isolated() {
        let mut registry = MetricRegistry::new();
        registry.register(Box::new(FaultyMetric));
        registry.register(Box::new(ConstMetric(0.5)));

        let request = Request::new("mcp1.local", "anything");
        let (set, failures) = registry.extract(&request);

        // The failing metric scores zero; the healthy one still contributes.
        assert_eq!(set.get("faulty"), Some(0.0));
        assert_eq!(set.get("constant"), Some(0.5));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].metric, "faulty");
        assert!(failures[0].detail.contains("intentional"));
    }

    #[test]
    fn test_default_registry_names() {
        let registry = MetricRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["pliny_score", "rogue_glyphs", "tool_drift"]
        );
    }

    #[test]
    fn test_out_of_range_metric_clamped() {
        let mut registry = MetricRegistry::new();
        registry.register(Box::new(ConstMetric(42.0)));
        let request = Request::new("mcp1.local", "x");
        let (set, failures) = registry.extract(&request);
        assert!(failures.is_empty());
        assert_eq!(set.get("constant"), Some(1.0));
    }
}
