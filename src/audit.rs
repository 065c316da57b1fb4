//! Append-only audit trail for analysis outcomes.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::metrics::{MetricFailure, MetricSet};
use crate::response::ResponseAction;
use crate::verdict::Verdict;

/// One completed analysis: verdict, action taken, and the metrics behind it.
///
/// Opaque to the core; consumed externally for observability.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub session_id: String,
    pub request_id: Uuid,
    pub verdict: Verdict,
    pub reason: String,
    pub action_taken: ResponseAction,
    pub metrics: MetricSet,
    pub timestamp: DateTime<Utc>,
}

/// Destination for audit records.
pub trait AuditSink: Send + Sync {
    /// Record a completed analysis.
    fn record(&self, record: &AuditRecord);

    /// Record a metric that failed during extraction.
    fn metric_failure(&self, failure: &MetricFailure) {
        tracing::warn!(
            metric = %failure.metric,
            request_id = %failure.request_id,
            detail = %failure.detail,
            "metric extraction failed"
        );
    }
}

/// Audit sink that emits structured tracing events.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        tracing::info!(
            session_id = %record.session_id,
            request_id = %record.request_id,
            verdict = %record.verdict,
            action = %record.action_taken,
            reason = %record.reason,
            "analysis complete"
        );
    }
}

/// In-memory audit sink for tests and introspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
    failures: Mutex<Vec<MetricFailure>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded analyses.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit lock poisoned").clone()
    }

    /// Snapshot of recorded metric failures.
    pub fn failures(&self) -> Vec<MetricFailure> {
        self.failures.lock().expect("audit lock poisoned").clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) {
        self.records
            .lock()
            .expect("audit lock poisoned")
            .push(record.clone());
    }

    fn metric_failure(&self, failure: &MetricFailure) {
        self.failures
            .lock()
            .expect("audit lock poisoned")
            .push(failure.clone());
    }
}
