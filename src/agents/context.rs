//! Enhancement context - the client and settings every stage reads.
//!
//! Passed explicitly into the orchestrator and from there to each call site;
//! there is no process-wide client.

use std::sync::Arc;

use crate::config::Config;
use crate::llm::{with_retry, GenerationClient, GenerationRequest, GenerationResponse, LlmError};
use crate::llm::{ReasoningEffort, RetryPolicy};

use super::events::{emit_to, EnhancementEvent, EventSink};

/// Shared context for one or more enhancement runs.
///
/// # Thread Safety
/// Cheap to clone; the client and sink are behind `Arc`.
#[derive(Clone)]
pub struct EnhancementContext {
    /// Generation backend
    pub client: Arc<dyn GenerationClient>,

    /// Model identifier for every call
    pub model: String,

    /// Reasoning budget for the identifier call
    pub identifier_effort: Option<ReasoningEffort>,

    /// Reasoning budget for sub-agent calls
    pub sub_agent_effort: Option<ReasoningEffort>,

    /// Maximum number of tasks kept from the identifier
    pub max_tasks: usize,

    /// Backoff applied around every generation call
    pub retry: RetryPolicy,

    /// Grounding/reference store the backend may consult
    pub grounding_store: Option<String>,

    /// Optional observer for progress events
    pub events: Option<Arc<dyn EventSink>>,
}

impl EnhancementContext {
    /// Create a context from configuration.
    pub fn new(config: &Config, client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            model: config.model.clone(),
            identifier_effort: config.identifier_effort,
            sub_agent_effort: config.sub_agent_effort,
            max_tasks: config.max_tasks,
            retry: config.retry.clone(),
            grounding_store: config.grounding_store.clone(),
            events: None,
        }
    }

    /// Attach an event sink.
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one generation call through the retry wrapper.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        with_retry(&self.retry, || self.client.generate(request)).await
    }

    /// Emit a progress event (no-op without a sink).
    pub fn emit(&self, event: EnhancementEvent) {
        emit_to(self.events.as_deref(), event);
    }
}

impl std::fmt::Debug for EnhancementContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancementContext")
            .field("model", &self.model)
            .field("identifier_effort", &self.identifier_effort)
            .field("sub_agent_effort", &self.sub_agent_effort)
            .field("max_tasks", &self.max_tasks)
            .field("retry", &self.retry)
            .field("grounding_store", &self.grounding_store)
            .field("has_events", &self.events.is_some())
            .finish()
    }
}
