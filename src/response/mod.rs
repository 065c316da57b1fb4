//! Graduated response state machine.
//!
//! The controller owns all session state and is the single place in the
//! pipeline requiring mutual exclusion: concurrent analysis completions for
//! one session serialize on that session's lock, so the monotonic ratchet
//! holds under race. Escalation actions are emitted as messages on a
//! directive channel the agent-output collaborator subscribes to, never by
//! reaching into the agent directly.

mod session;

pub use session::{SessionState, VerdictRecord};

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::verdict::Verdict;

/// Mitigation applied when a session crosses into a verdict level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAction {
    /// Nothing to do.
    None,
    /// Trim/redact agent output for this and all later turns.
    Trim,
    /// Route later requests to a restricted handling path.
    Isolate,
    /// Terminate the session and refuse everything further.
    Kill,
}

impl ResponseAction {
    /// Action executed when crossing into a verdict level.
    pub fn for_level(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Clear => ResponseAction::None,
            Verdict::Soft => ResponseAction::Trim,
            Verdict::Hard => ResponseAction::Isolate,
            Verdict::Tripwire => ResponseAction::Kill,
        }
    }
}

impl fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResponseAction::None => "none",
            ResponseAction::Trim => "trim",
            ResponseAction::Isolate => "isolate",
            ResponseAction::Kill => "kill",
        })
    }
}

/// Escalation message for the agent-output collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDirective {
    pub session_id: String,
    pub action: ResponseAction,
}

/// Stream of escalation directives, one per level crossing.
pub type DirectiveStream = UnboundedReceiverStream<SessionDirective>;

/// Owns session state and drives irreversible escalation.
pub struct ResponseController {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
    directives: mpsc::UnboundedSender<SessionDirective>,
}

impl ResponseController {
    /// Create a controller and the directive stream its escalations feed.
    ///
    /// Dropping the stream is allowed; directives are then discarded.
    pub fn new() -> (Self, DirectiveStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sessions: RwLock::new(HashMap::new()),
                directives: tx,
            },
            UnboundedReceiverStream::new(rx),
        )
    }

    /// Fold a verdict into a session, applying its response action on a
    /// level crossing.
    ///
    /// Unknown sessions are created lazily at `Clear` — a session always
    /// exists virtually before its first verdict. Returns the action taken.
    pub async fn update(&self, session_id: &str, verdict: Verdict, reason: &str) -> ResponseAction {
        let state = self.get_or_create(session_id).await;
        let mut state = state.lock().await;
        let action = state.apply(verdict, reason);

        if action != ResponseAction::None {
            tracing::warn!(
                session_id,
                verdict = %verdict,
                action = %action,
                reason,
                "escalating session"
            );
            // Receiver may be gone; escalation state is still authoritative.
            let _ = self.directives.send(SessionDirective {
                session_id: session_id.to_string(),
                action,
            });
        }

        action
    }

    /// Whether the tripwire response has executed for this session.
    pub async fn is_killed(&self, session_id: &str) -> bool {
        match self.get(session_id).await {
            Some(state) => state.lock().await.is_killed(),
            None => false,
        }
    }

    /// Cumulative response level, if the session exists.
    pub async fn current_level(&self, session_id: &str) -> Option<Verdict> {
        match self.get(session_id).await {
            Some(state) => Some(state.lock().await.current_level()),
            None => None,
        }
    }

    /// Verdict delivery log, if the session exists.
    pub async fn history(&self, session_id: &str) -> Option<Vec<VerdictRecord>> {
        match self.get(session_id).await {
            Some(state) => Some(state.lock().await.history().to_vec()),
            None => None,
        }
    }

    /// Drop a session's state (external close/archive).
    ///
    /// Returns whether a session was removed. A killed session that is
    /// closed stops being refused only because it no longer exists; an
    /// explicit reset is the caller's policy decision.
    pub async fn close_session(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    async fn get(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.read().await.get(session_id).map(Arc::clone)
    }

    async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        // Fast path: session exists.
        {
            let sessions = self.sessions.read().await;
            if let Some(state) = sessions.get(session_id) {
                return Arc::clone(state);
            }
        }

        // Slow path: create, double-checking after taking the write lock.
        let mut sessions = self.sessions.write().await;
        if let Some(state) = sessions.get(session_id) {
            return Arc::clone(state);
        }
        let state = Arc::new(Mutex::new(SessionState::new(session_id)));
        sessions.insert(session_id.to_string(), Arc::clone(&state));
        state
    }
}

/// Truncate agent output for a session in the trim regime.
///
/// Cuts on a char boundary and appends a visible marker; short output is
/// returned borrowed and untouched.
pub fn trim_output(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    let cut: String = text.chars().take(max_chars).collect();
    Cow::Owned(format!("{cut} [output trimmed]"))
}
