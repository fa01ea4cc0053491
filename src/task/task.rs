//! Enhancement task: one underspecified claim in the report.
//!
//! # Invariants
//! - `task_id` is unique within one enhancement run
//! - `original_quote` is meant to be a verbatim substring of the report at
//!   identification time; a violation is a data-quality defect, surfaced by
//!   [`EnhancementTask::is_quote_verbatim`], never a crash

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a task within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier synthesized for the `index`-th task when the backend omitted one.
    pub fn synthesized(index: usize) -> Self {
        Self(format!("task-{}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Priority tier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Ordering rank used by the substitution engine (`high=3, medium=2, low=1`).
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    /// Lenient parse of backend output; anything unrecognized degrades to `Low`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Priority::Low)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A claim in the report that needs factual backing.
///
/// Created in bulk by the task identifier and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementTask {
    pub task_id: TaskId,
    /// Description of the missing data
    pub research_task: String,
    /// Verbatim report excerpt to replace
    pub original_quote: String,
    /// Kind of data needed
    pub enhancement_focus: String,
    /// Why the replacement improves the report
    pub expected_improvement: String,
    pub priority: Priority,
    /// Source-type hints
    pub data_sources_needed: Vec<String>,
}

impl EnhancementTask {
    /// Create a task with empty descriptive fields.
    pub fn new(
        task_id: impl Into<String>,
        original_quote: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            task_id: TaskId::new(task_id),
            research_task: String::new(),
            original_quote: original_quote.into(),
            enhancement_focus: String::new(),
            expected_improvement: String::new(),
            priority,
            data_sources_needed: Vec::new(),
        }
    }

    /// Set the research goal.
    pub fn with_research_task(mut self, research_task: impl Into<String>) -> Self {
        self.research_task = research_task.into();
        self
    }

    /// Check that the quote still appears verbatim in `report`.
    pub fn is_quote_verbatim(&self, report: &str) -> bool {
        !self.original_quote.is_empty() && report.contains(&self.original_quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn test_priority_lenient_parse() {
        assert_eq!(Priority::parse_lenient("HIGH"), Priority::High);
        assert_eq!(Priority::parse_lenient(" medium "), Priority::Medium);
        assert_eq!(Priority::parse_lenient("critical"), Priority::Low);
        assert_eq!(Priority::parse_lenient(""), Priority::Low);
    }

    #[test]
    fn test_task_wire_names() {
        let task = EnhancementTask::new("t1", "Revenue grew significantly.", Priority::High)
            .with_research_task("Find revenue growth rate");
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["taskId"], "t1");
        assert_eq!(value["originalQuote"], "Revenue grew significantly.");
        assert_eq!(value["priority"], "high");
        assert!(value["dataSourcesNeeded"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_quote_verbatim_check() {
        let task = EnhancementTask::new("t1", "grew significantly", Priority::High);
        assert!(task.is_quote_verbatim("Revenue grew significantly."));
        assert!(!task.is_quote_verbatim("Revenue grew   significantly."));

        let empty = EnhancementTask::new("t2", "", Priority::High);
        assert!(!empty.is_quote_verbatim("anything"));
    }
}
