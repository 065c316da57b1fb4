//! Screening pipeline configuration.
//!
//! Plain data with sensible defaults. Loading from files or the environment
//! is the caller's concern.

use crate::voter::VoterConfig;

/// Configuration for the full screening pipeline.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    /// Source ids the gate admits. Empty means no source is trusted.
    pub trusted_sources: Vec<String>,
    /// Injection-signature substrings the gate rejects on.
    ///
    /// Matched case-insensitively over whitespace- and NFKC-normalized text.
    pub signatures: Vec<String>,
    /// Per-metric weights and verdict band thresholds.
    pub voter: VoterConfig,
    /// Maximum agent-output length (in chars) once a session is in the
    /// trim regime.
    pub trim_max_len: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            // Deny-all until configured.
            trusted_sources: Vec::new(),
            signatures: default_signatures(),
            voter: VoterConfig::default(),
            trim_max_len: 400,
        }
    }
}

/// Default injection-signature list for the synchronous gate.
///
/// Deliberately short: the gate is a cheap pre-filter, not the deep
/// analysis. Anything subtler is Aegis's job.
pub fn default_signatures() -> Vec<String> {
    [
        // Direct instruction override
        "ignore previous",
        "ignore all previous",
        "forget everything",
        "repeat exactly",
        "new instructions",
        // Role manipulation
        "you are now",
        "developer mode",
        // Conversation-role injection
        "system:",
        "assistant:",
        // Special token injection
        "<|",
        "[INST]",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
