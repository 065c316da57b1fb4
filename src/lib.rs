//! Defense-in-depth request screening for LLM agents.
//!
//! Every inbound prompt passes a synchronous gate (the [`Sentinel`]) that
//! decides admit/reject in bounded time from a trust lookup and a signature
//! scan. Admitted prompts are forked to the agent and to the asynchronous
//! [`Aegis`] engine, which extracts independent risk metrics, votes them
//! into a single ordered [`Verdict`], and drives a monotonic graduated
//! response per session: trim output, isolate the session, or kill it.
//!
//! Detection is heuristic by design; the contract this crate makes is that
//! the combination and response logic is deterministic, the escalation
//! ratchet never rolls back, and the synchronous path is never blocked by
//! the asynchronous one.

pub mod aegis;
pub mod audit;
pub mod config;
pub mod gate;
pub mod metrics;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod verdict;
pub mod voter;

pub use aegis::Aegis;
pub use audit::{AuditRecord, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use config::ScreenConfig;
pub use gate::{
    GateDecision, RejectReason, Sentinel, SignatureScanner, StaticTrustRegistry, TrustRegistry,
};
pub use metrics::{Metric, MetricFailure, MetricRegistry, MetricSet};
pub use pipeline::Pipeline;
pub use request::Request;
pub use response::{
    DirectiveStream, ResponseAction, ResponseController, SessionDirective, SessionState,
    VerdictRecord, trim_output,
};
pub use verdict::Verdict;
pub use voter::{ConfigError, EnsembleVoter, MetricBands, Vote, VoterConfig};
