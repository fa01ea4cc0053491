//! Progress events emitted by the orchestrator.
//!
//! Events are purely observational. A sink that errors or panics is logged and
//! otherwise ignored; the pipeline outcome never depends on it.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::substitution::SubstitutionOutcome;
use crate::task::{EnhancementResult, EnhancementTask};

/// Pipeline progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnhancementEvent {
    /// Identification is about to start.
    Identifying { report_chars: usize },
    /// The identifier's full task list (all priorities).
    Tasks {
        tasks: Vec<EnhancementTask>,
        overall_strategy: String,
    },
    /// An eligible task was dispatched to a sub-agent.
    TaskStarted { task: EnhancementTask },
    /// A sub-agent call is starting.
    SubtaskStarted { task: EnhancementTask },
    /// A sub-agent call finished (successfully or with a fallback).
    SubtaskCompleted { result: EnhancementResult },
    /// Substitution finished.
    Enhancements {
        results: Vec<EnhancementResult>,
        substitution: SubstitutionOutcome,
    },
}

impl EnhancementEvent {
    /// Discriminant name as serialized.
    pub fn kind(&self) -> &'static str {
        match self {
            EnhancementEvent::Identifying { .. } => "identifying",
            EnhancementEvent::Tasks { .. } => "tasks",
            EnhancementEvent::TaskStarted { .. } => "task_started",
            EnhancementEvent::SubtaskStarted { .. } => "subtask_started",
            EnhancementEvent::SubtaskCompleted { .. } => "subtask_completed",
            EnhancementEvent::Enhancements { .. } => "enhancements",
        }
    }
}

/// Receiver of pipeline events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EnhancementEvent) -> anyhow::Result<()>;
}

/// Adapter turning a closure into an [`EventSink`].
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: Fn(EnhancementEvent) + Send + Sync,
{
    fn emit(&self, event: EnhancementEvent) -> anyhow::Result<()> {
        (self.0)(event);
        Ok(())
    }
}

impl EventSink for broadcast::Sender<EnhancementEvent> {
    fn emit(&self, event: EnhancementEvent) -> anyhow::Result<()> {
        // No subscribers is not a failure worth reporting.
        let _ = self.send(event);
        Ok(())
    }
}

/// Deliver `event` to `sink` if present, swallowing errors and panics.
pub(crate) fn emit_to(sink: Option<&dyn EventSink>, event: EnhancementEvent) {
    let Some(sink) = sink else {
        return;
    };
    let kind = event.kind();
    match catch_unwind(AssertUnwindSafe(|| sink.emit(event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("Event sink rejected '{}' event: {}", kind, e),
        Err(_) => tracing::warn!("Event sink panicked while handling '{}' event", kind),
    }
}
