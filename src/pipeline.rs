//! Ingress facade wiring the gate to the analysis engine.

use std::borrow::Cow;
use std::sync::Arc;

use crate::aegis::Aegis;
use crate::audit::AuditSink;
use crate::config::ScreenConfig;
use crate::gate::{
    GateDecision, RejectReason, Sentinel, SignatureScanner, StaticTrustRegistry, TrustRegistry,
};
use crate::metrics::MetricRegistry;
use crate::request::Request;
use crate::response::{DirectiveStream, ResponseController, trim_output};
use crate::voter::EnsembleVoter;

/// The assembled screening pipeline.
///
/// `submit` is the single ingress point: the synchronous gate decides
/// admit/reject inline, and admitted requests are forked to deep analysis
/// while the caller proceeds with agent execution.
pub struct Pipeline {
    sentinel: Sentinel,
    aegis: Aegis,
    controller: Arc<ResponseController>,
    trim_max_len: usize,
}

impl Pipeline {
    /// Assemble a pipeline from configuration, trusting the sources listed
    /// in `config.trusted_sources`.
    ///
    /// Returns the pipeline and the directive stream the agent-output
    /// collaborator should consume.
    pub fn new(config: ScreenConfig, audit: Arc<dyn AuditSink>) -> (Self, DirectiveStream) {
        let trust = Arc::new(StaticTrustRegistry::new(config.trusted_sources.clone()));
        Self::with_trust(config, trust, audit)
    }

    /// Assemble a pipeline with an injected trust registry.
    pub fn with_trust(
        config: ScreenConfig,
        trust: Arc<dyn TrustRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> (Self, DirectiveStream) {
        Self::with_parts(config, trust, MetricRegistry::with_defaults(), audit)
    }

    /// Assemble a pipeline with an injected trust registry and a custom
    /// metric registry.
    pub fn with_parts(
        config: ScreenConfig,
        trust: Arc<dyn TrustRegistry>,
        metrics: MetricRegistry,
        audit: Arc<dyn AuditSink>,
    ) -> (Self, DirectiveStream) {
        let (controller, directives) = ResponseController::new();
        let controller = Arc::new(controller);

        let trim_max_len = config.trim_max_len;
        let sentinel = Sentinel::new(trust, SignatureScanner::new(config.signatures));
        let aegis = Aegis::new(
            Arc::new(metrics),
            Arc::new(EnsembleVoter::new(config.voter)),
            Arc::clone(&controller),
            audit,
        );

        (
            Self {
                sentinel,
                aegis,
                controller,
                trim_max_len,
            },
            directives,
        )
    }

    /// Trim agent output to the configured length.
    ///
    /// For the agent-output collaborator: once a session has received a
    /// `Trim` directive, every outbound turn for it goes through here.
    pub fn trim<'a>(&self, text: &'a str) -> Cow<'a, str> {
        trim_output(text, self.trim_max_len)
    }

    /// Screen one request.
    ///
    /// Order matters: a killed session refuses everything unconditionally,
    /// before the gate even looks at the request. On `Admit`, analysis is
    /// scheduled and the caller proceeds with agent execution; on `Reject`,
    /// nothing further runs for this request.
    pub async fn submit(&self, request: &Request, session_id: &str) -> GateDecision {
        if self.controller.is_killed(session_id).await {
            return GateDecision::Reject(RejectReason::SessionKilled);
        }

        let decision = self.sentinel.check(request);
        if decision.is_admit() {
            self.aegis.analyze(request.clone(), session_id);
        }
        decision
    }

    /// The response controller, for session-level queries (tool-call hooks,
    /// status surfaces) and external session close.
    pub fn controller(&self) -> &Arc<ResponseController> {
        &self.controller
    }

    /// The analysis engine, for callers that schedule analysis themselves.
    pub fn aegis(&self) -> &Aegis {
        &self.aegis
    }
}
