//! Inbound request value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single prompt submission, captured at ingress.
///
/// Immutable once constructed; the pipeline owns it for the duration of
/// processing and discards it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Unique id for this submission.
    pub id: Uuid,
    /// Claimed origin of the request (looked up in the trust registry).
    pub source_id: String,
    /// Raw prompt text.
    pub text: String,
    /// Ingress timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Request {
    /// Create a request, stamping a fresh id and the current time.
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id: source_id.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
