//! Asynchronous analysis engine.
//!
//! Runs extraction → voting → response update for each admitted request,
//! off the synchronous admission path. Analysis may run concurrently with
//! the agent's own execution of the request and with analysis of other
//! requests, including others in the same session; per-session ordering is
//! enforced by the response controller, not here.

use std::sync::Arc;

use chrono::Utc;

use crate::audit::{AuditRecord, AuditSink};
use crate::metrics::MetricRegistry;
use crate::request::Request;
use crate::response::{ResponseAction, ResponseController};
use crate::voter::{EnsembleVoter, Vote};

/// The asynchronous engine.
#[derive(Clone)]
pub struct Aegis {
    registry: Arc<MetricRegistry>,
    voter: Arc<EnsembleVoter>,
    controller: Arc<ResponseController>,
    audit: Arc<dyn AuditSink>,
}

impl Aegis {
    pub fn new(
        registry: Arc<MetricRegistry>,
        voter: Arc<EnsembleVoter>,
        controller: Arc<ResponseController>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            registry,
            voter,
            controller,
            audit,
        }
    }

    /// Fire-and-forget analysis of an admitted request.
    ///
    /// Spawns the work and returns immediately; the outcome reaches the
    /// session through the response controller and the audit sink.
    pub fn analyze(&self, request: Request, session_id: &str) {
        let engine = self.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            engine.process(&request, &session_id).await;
        });
    }

    /// Run one analysis to completion.
    ///
    /// Extraction and voting are pure and non-cancellable; the only shared
    /// mutable state touched is the session, inside the controller. If the
    /// session was killed while this analysis was in flight, the verdict is
    /// advisory and the controller ignores it.
    pub async fn process(&self, request: &Request, session_id: &str) -> (Vote, ResponseAction) {
        let (metrics, failures) = self.registry.extract(request);
        for failure in &failures {
            self.audit.metric_failure(failure);
        }

        let vote = self.voter.vote(&metrics);
        let action = self
            .controller
            .update(session_id, vote.verdict, &vote.reason)
            .await;

        self.audit.record(&AuditRecord {
            session_id: session_id.to_string(),
            request_id: request.id,
            verdict: vote.verdict,
            reason: vote.reason.clone(),
            action_taken: action,
            metrics,
            timestamp: Utc::now(),
        });

        (vote, action)
    }
}
