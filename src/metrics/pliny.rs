//! Structural-override heuristic (`pliny_score`).
//!
//! Detects attempts to redefine the agent's role, system instructions, or
//! output format from inside the prompt body: jailbreak markers, imperative
//! override phrasing, and fake citation/reference scaffolding. The score
//! grows with the number of distinct signals and saturates quickly.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use regex::Regex;

use crate::metrics::Metric;
use crate::request::Request;

/// Distinct signals needed to saturate the score at 1.0.
const SATURATION_HITS: f64 = 5.0;

/// Known jailbreak-persona and mode markers.
const MARKERS: &[&str] = &["pliny", "{godmode:enabled}", "liberated", "pwned"];

/// Imperative override phrasing.
const IMPERATIVES: &[&str] = &["disregard", "override", "ignore", "continue regardless"];

/// The `pliny_score` metric.
pub struct PlinyScore {
    matcher: AhoCorasick,
    numbered_tail: Regex,
    references_block: Regex,
}

impl PlinyScore {
    /// Build the metric with its default signal lists.
    pub fn new() -> Self {
        let patterns: Vec<&str> = MARKERS.iter().chain(IMPERATIVES).copied().collect();
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(patterns)
            .expect("Failed to build override matcher");

        Self {
            matcher,
            // Prompt ending in a numbered item, mimicking list-format override.
            numbered_tail: Regex::new(r"\(\d+\)[\s\w]+$").expect("Invalid numbered-tail regex"),
            // Fake academic scaffolding used to smuggle instructions.
            references_block: Regex::new(r"\n\s*REFERENCES\s*\n")
                .expect("Invalid references regex"),
        }
    }

    fn distinct_phrase_hits(&self, text: &str) -> usize {
        let mut seen: HashSet<usize> = HashSet::new();
        for mat in self.matcher.find_overlapping_iter(text) {
            seen.insert(mat.pattern().as_usize());
        }
        seen.len()
    }
}

impl Default for PlinyScore {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for PlinyScore {
    fn name(&self) -> &'static str {
        "pliny_score"
    }

    fn score(&self, request: &Request) -> f64 {
        let text = &request.text;
        if text.is_empty() {
            return 0.0;
        }

        let mut hits = self.distinct_phrase_hits(text);
        if self.numbered_tail.is_match(text) {
            hits += 1;
        }
        if self.references_block.is_match(text) {
            hits += 1;
        }

        (hits as f64 / SATURATION_HITS).min(1.0)
    }
}
