//! The ordered verdict scale produced by ensemble voting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of ensemble voting over risk metrics.
///
/// The scale is a total order: `Clear < Soft < Hard < Tripwire`. Escalation
/// decisions are made by folding verdicts with `max`, so the ordering is the
/// load-bearing part of this type.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No risk signal; no response action.
    #[default]
    Clear,
    /// Moderate signal; agent output gets trimmed.
    Soft,
    /// Strong signal; the session is isolated.
    Hard,
    /// Maximal signal; the session is killed.
    Tripwire,
}

impl Verdict {
    /// Lowercase label, as used in audit records and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Clear => "clear",
            Verdict::Soft => "soft",
            Verdict::Hard => "hard",
            Verdict::Tripwire => "tripwire",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_total_order() {
        assert!(Verdict::Clear < Verdict::Soft);
        assert!(Verdict::Soft < Verdict::Hard);
        assert!(Verdict::Hard < Verdict::Tripwire);
        assert_eq!(Verdict::Hard.max(Verdict::Soft), Verdict::Hard);
    }

    #[test]
    fn test_default_is_clear() {
        assert_eq!(Verdict::default(), Verdict::Clear);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Verdict::Tripwire).unwrap();
        assert_eq!(json, "\"tripwire\"");
    }
}
