//! Task module - enhancement tasks, their results, and the identifier's plan.
//!
//! Tasks and results are immutable value objects once created, so they can be
//! shared across concurrent sub-agent calls without locking.

mod task;
mod plan;
mod result;

pub use plan::{eligible_tasks, extract_json_object, TaskPlan};
pub use result::EnhancementResult;
pub use task::{EnhancementTask, Priority, TaskId};
