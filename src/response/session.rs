//! Per-session escalation state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::ResponseAction;
use crate::verdict::Verdict;

/// One verdict delivery, kept for audit.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictRecord {
    pub verdict: Verdict,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Mutable escalation state for one session.
///
/// `current_level` is a ratchet: it mirrors the verdict scale and only ever
/// moves up, modeling irreversible trust erosion. Once the tripwire response
/// has executed the session is killed, an absorbing state that no later
/// verdict can touch.
#[derive(Debug)]
pub struct SessionState {
    session_id: String,
    current_level: Verdict,
    killed: bool,
    history: Vec<VerdictRecord>,
}

impl SessionState {
    /// Fresh session at `Clear` with empty history.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            current_level: Verdict::Clear,
            killed: false,
            history: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Cumulative worst response level ever applied.
    pub fn current_level(&self) -> Verdict {
        self.current_level
    }

    /// Whether the tripwire response has executed.
    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// Append-only delivery log.
    pub fn history(&self) -> &[VerdictRecord] {
        &self.history
    }

    /// Fold a verdict into the session.
    ///
    /// Appends to history unconditionally, then ratchets the level with
    /// `max`. Returns the response action to execute, which is `None` unless
    /// this delivery strictly raised the level — re-delivering an applied or
    /// milder verdict is an idempotent no-op. Killed sessions ignore
    /// deliveries entirely (advisory verdicts from in-flight analysis).
    pub(crate) fn apply(&mut self, verdict: Verdict, reason: &str) -> ResponseAction {
        if self.killed {
            return ResponseAction::None;
        }

        self.history.push(VerdictRecord {
            verdict,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });

        if verdict <= self.current_level {
            return ResponseAction::None;
        }

        self.current_level = verdict;
        let action = ResponseAction::for_level(verdict);
        if verdict == Verdict::Tripwire {
            self.killed = true;
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_starts_clear_and_empty() {
        let state = SessionState::new("s1");
        assert_eq!(state.current_level(), Verdict::Clear);
        assert!(!state.is_killed());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_escalation_applies_action_once() {
        let mut state = SessionState::new("s1");
        assert_eq!(state.apply(Verdict::Soft, "r"), ResponseAction::Trim);
        assert_eq!(state.apply(Verdict::Soft, "r"), ResponseAction::None);
        assert_eq!(state.current_level(), Verdict::Soft);
        // Both deliveries are in the history.
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_no_downgrade() {
        let mut state = SessionState::new("s1");
        state.apply(Verdict::Soft, "r");
        state.apply(Verdict::Clear, "r");
        assert_eq!(state.current_level(), Verdict::Soft);
    }

    #[test]
    fn test_order_independent_fold() {
        let mut a = SessionState::new("s1");
        a.apply(Verdict::Hard, "r");
        a.apply(Verdict::Soft, "r");

        let mut b = SessionState::new("s1");
        b.apply(Verdict::Soft, "r");
        b.apply(Verdict::Hard, "r");

        assert_eq!(a.current_level(), b.current_level());
    }

    #[test]
    fn test_tripwire_kills_in_one_step() {
        let mut state = SessionState::new("s1");
        assert_eq!(state.apply(Verdict::Tripwire, "r"), ResponseAction::Kill);
        assert!(state.is_killed());
        assert_eq!(state.current_level(), Verdict::Tripwire);
    }

    #[test]
    fn test_killed_is_absorbing() {
        let mut state = SessionState::new("s1");
        state.apply(Verdict::Tripwire, "r");
        let history_len = state.history().len();

        assert_eq!(state.apply(Verdict::Hard, "late"), ResponseAction::None);
        assert_eq!(state.apply(Verdict::Tripwire, "late"), ResponseAction::None);
        // Advisory verdicts leave a killed session untouched.
        assert_eq!(state.history().len(), history_len);
        assert!(state.is_killed());
    }

    #[test]
    fn test_skip_level_escalation() {
        let mut state = SessionState::new("s1");
        assert_eq!(state.apply(Verdict::Hard, "r"), ResponseAction::Isolate);
        assert_eq!(state.current_level(), Verdict::Hard);
    }
}
