//! Agents module - the master/sub-agent enhancement pipeline.
//!
//! # Agent Types
//! - **TaskIdentifier**: one call over the full report, yields a task plan
//! - **SubAgent**: one call per high-priority task, yields a replacement
//! - **Orchestrator**: sequences both and splices results back into the report
//!
//! # Design Principles
//! - Client and settings travel in an explicit [`EnhancementContext`]
//! - Sub-agents run concurrently and never fail the run
//! - The report is only written by the sequential substitution pass

mod context;
mod events;
mod identifier;
mod orchestrator;
mod prompts;
mod sub_agent;

pub use context::EnhancementContext;
pub use events::{EnhancementEvent, EventSink, FnSink};
pub use identifier::TaskIdentifier;
pub use orchestrator::{Completion, EnhancementOutcome, Orchestrator, PipelineError, RunStage};
pub use sub_agent::{SourceMaterial, SubAgent};
