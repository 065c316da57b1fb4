//! Tool-graph escape metric (`tool_drift`).
//!
//! Binary signal: the prompt names a privileged tool surface it has no
//! business steering directly. Configured to the tripwire band by default —
//! one hit is enough to kill the session.

use crate::metrics::Metric;
use crate::request::Request;

/// The `tool_drift` metric.
pub struct ToolDrift {
    privileged: Vec<String>,
}

impl ToolDrift {
    /// Build the metric from a list of privileged tool names.
    pub fn new<I, S>(privileged: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged: privileged
                .into_iter()
                .map(|s| s.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for ToolDrift {
    fn default() -> Self {
        Self::new(["access_database"])
    }
}

impl Metric for ToolDrift {
    fn name(&self) -> &'static str {
        "tool_drift"
    }

    fn score(&self, request: &Request) -> f64 {
        let lowered = request.text.to_lowercase();
        if self.privileged.iter().any(|tool| lowered.contains(tool)) {
            1.0
        } else {
            0.0
        }
    }
}
