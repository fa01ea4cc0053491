//! Outcome of running one enhancement task.

use serde::{Deserialize, Serialize};

use super::{EnhancementTask, Priority, TaskId};

/// Result of a sub-agent call for one task.
///
/// # Invariants
/// - `enhanced_content` is never empty
/// - when no improvement was made, `enhanced_content == original_quote` byte for byte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    pub task_id: TaskId,
    pub original_quote: String,
    pub enhanced_content: String,
    pub research_task: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnhancementResult {
    /// Result carrying replacement text for `task`.
    ///
    /// Empty or whitespace-only content is treated as "no improvement".
    pub fn enhanced(task: &EnhancementTask, content: impl Into<String>) -> Self {
        let content = content.into();
        let enhanced_content = if content.trim().is_empty() {
            task.original_quote.clone()
        } else {
            content
        };
        Self {
            task_id: task.task_id.clone(),
            original_quote: task.original_quote.clone(),
            enhanced_content,
            research_task: task.research_task.clone(),
            priority: task.priority,
            error: None,
        }
    }

    /// Safe fallback for a failed call: the quote is left as is.
    pub fn failed(task: &EnhancementTask, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            task_id: task.task_id.clone(),
            original_quote: task.original_quote.clone(),
            enhanced_content: task.original_quote.clone(),
            research_task: task.research_task.clone(),
            priority: task.priority,
            error: Some(if error.is_empty() {
                "unknown error".to_string()
            } else {
                error
            }),
        }
    }

    /// Whether applying this result would change the report.
    pub fn is_modified(&self) -> bool {
        self.enhanced_content != self.original_quote
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> EnhancementTask {
        EnhancementTask::new("t1", "Revenue grew significantly.", Priority::High)
    }

    #[test]
    fn test_enhanced_result() {
        let result = EnhancementResult::enhanced(&task(), "Revenue grew 34% YoY to $12M.");
        assert!(result.is_modified());
        assert!(!result.is_failure());
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn test_blank_content_is_no_op() {
        let result = EnhancementResult::enhanced(&task(), "  \n ");
        assert_eq!(result.enhanced_content, "Revenue grew significantly.");
        assert!(!result.is_modified());
    }

    #[test]
    fn test_failed_result_falls_back_to_quote() {
        let result = EnhancementResult::failed(&task(), "Overloaded (HTTP 503): busy");
        assert_eq!(result.enhanced_content, result.original_quote);
        assert!(!result.is_modified());
        assert_eq!(result.error.as_deref(), Some("Overloaded (HTTP 503): busy"));

        let result = EnhancementResult::failed(&task(), "");
        assert!(!result.error.unwrap().is_empty());
    }
}
