//! Quote substitution engine.
//!
//! Applies sub-agent results back into the report, one at a time, in priority
//! order (`high` first; ties keep encounter order). Each step reads the report
//! as left by the previous step:
//! 1. skip results that carry no change
//! 2. replace the first exact occurrence of the quote
//! 3. otherwise match with whitespace collapsed and splice the recovered span
//! 4. otherwise record the result as unmatched and leave the report untouched
//!
//! A lower-priority quote may no longer be found once a higher-priority
//! replacement consumed its text. That result is reported as unmatched.

mod normalize;

pub use normalize::{normalize_whitespace, NormalizedText};

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::task::{EnhancementResult, Priority, TaskId};

/// How a single result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Quote found verbatim
    Exact,
    /// Quote found after collapsing whitespace
    Normalized,
    /// Result carried no change
    Unchanged,
    /// Quote not found; report left as is
    Unmatched,
}

impl MatchMode {
    pub fn is_applied(self) -> bool {
        matches!(self, MatchMode::Exact | MatchMode::Normalized)
    }
}

/// Record of one substitution step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub task_id: TaskId,
    pub priority: Priority,
    pub mode: MatchMode,
}

/// The mutated report and what happened to each result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionOutcome {
    pub report: String,
    /// Number of replacements actually spliced in
    pub applied: usize,
    /// One entry per result, in application order
    pub applications: Vec<Application>,
}

impl SubstitutionOutcome {
    /// Results whose quote could not be located.
    pub fn unmatched(&self) -> Vec<&TaskId> {
        self.applications
            .iter()
            .filter(|a| a.mode == MatchMode::Unmatched)
            .map(|a| &a.task_id)
            .collect()
    }
}

/// Apply one replacement to `report` and return the updated copy.
pub fn apply_one(report: String, original_quote: &str, enhanced_content: &str) -> (String, MatchMode) {
    if enhanced_content == original_quote {
        return (report, MatchMode::Unchanged);
    }
    if original_quote.trim().is_empty() {
        return (report, MatchMode::Unmatched);
    }

    if let Some(start) = report.find(original_quote) {
        let mut report = report;
        report.replace_range(start..start + original_quote.len(), enhanced_content);
        return (report, MatchMode::Exact);
    }

    match NormalizedText::new(&report).find_original_span(original_quote) {
        Some(span) => {
            let mut report = report;
            report.replace_range(span, enhanced_content);
            (report, MatchMode::Normalized)
        }
        None => (report, MatchMode::Unmatched),
    }
}

/// Apply all `results` to `report` in priority order.
pub fn apply_enhancements(report: String, results: &[EnhancementResult]) -> SubstitutionOutcome {
    let mut ordered: Vec<&EnhancementResult> = results.iter().collect();
    // Stable sort keeps encounter order within a tier.
    ordered.sort_by_key(|r| Reverse(r.priority.rank()));

    let mut report = report;
    let mut applied = 0;
    let mut applications = Vec::with_capacity(ordered.len());

    for result in ordered {
        let (updated, mode) = apply_one(report, &result.original_quote, &result.enhanced_content);
        report = updated;

        match mode {
            MatchMode::Exact | MatchMode::Normalized => {
                applied += 1;
                tracing::debug!(
                    task_id = %result.task_id,
                    mode = ?mode,
                    "Applied enhancement"
                );
            }
            MatchMode::Unmatched => {
                tracing::warn!(
                    task_id = %result.task_id,
                    priority = %result.priority,
                    "Could not locate quote in report, skipping: {:.80}",
                    result.original_quote
                );
            }
            MatchMode::Unchanged => {}
        }

        applications.push(Application {
            task_id: result.task_id.clone(),
            priority: result.priority,
            mode,
        });
    }

    SubstitutionOutcome {
        report,
        applied,
        applications,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::EnhancementTask;

    fn result(id: &str, quote: &str, enhanced: &str, priority: Priority) -> EnhancementResult {
        EnhancementResult::enhanced(&EnhancementTask::new(id, quote, priority), enhanced)
    }

    const REPORT: &str = "## Traction\nRevenue grew significantly. Customers love the product.\n";

    #[test]
    fn test_unchanged_result_is_idempotent() {
        let r = result("t1", "Revenue grew significantly.", "Revenue grew significantly.", Priority::High);
        let outcome = apply_enhancements(REPORT.to_string(), &[r]);
        assert_eq!(outcome.report, REPORT);
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.applications[0].mode, MatchMode::Unchanged);
    }

    #[test]
    fn test_exact_substitution_touches_only_the_quote() {
        let r = result(
            "t1",
            "Revenue grew significantly.",
            "Revenue grew 34% YoY to $12M.",
            Priority::High,
        );
        let outcome = apply_enhancements(REPORT.to_string(), &[r]);
        assert_eq!(
            outcome.report,
            "## Traction\nRevenue grew 34% YoY to $12M. Customers love the product.\n"
        );
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.applications[0].mode, MatchMode::Exact);
    }

    #[test]
    fn test_exact_replaces_first_occurrence_only() {
        let report = "Growth was strong. Later: Growth was strong.".to_string();
        let r = result("t1", "Growth was strong.", "Growth was 20%.", Priority::High);
        let outcome = apply_enhancements(report, &[r]);
        assert_eq!(outcome.report, "Growth was 20%. Later: Growth was strong.");
    }

    #[test]
    fn test_normalized_substitution() {
        let report = "## Traction\nRevenue   grew\nsignificantly. Customers love it.".to_string();
        let r = result(
            "t1",
            "Revenue grew significantly.",
            "Revenue grew 34% YoY to $12M.",
            Priority::High,
        );
        let outcome = apply_enhancements(report, &[r]);
        assert_eq!(
            outcome.report,
            "## Traction\nRevenue grew 34% YoY to $12M. Customers love it."
        );
        assert_eq!(outcome.applications[0].mode, MatchMode::Normalized);
    }

    #[test]
    fn test_normalized_preserves_blank_lines_around_span() {
        let report = "Intro.\r\n\r\n  Revenue\t grew  significantly.  \r\n\r\nOutro.".to_string();
        let r = result("t1", "Revenue grew significantly.", "Revenue grew 34%.", Priority::High);
        let outcome = apply_enhancements(report, &[r]);
        assert_eq!(outcome.report, "Intro.\r\n\r\n  Revenue grew 34%.  \r\n\r\nOutro.");
    }

    #[test]
    fn test_priority_ordering_with_overlap() {
        let report = "Revenue grew significantly in 2023 across all regions.".to_string();
        // Medium first in encounter order: sorting must still apply the high one first.
        let medium = result(
            "m",
            "significantly in 2023 across all regions",
            "by 12% in 2023 across 4 regions",
            Priority::Medium,
        );
        let high = result(
            "h",
            "Revenue grew significantly in 2023",
            "Revenue grew 34% in 2023",
            Priority::High,
        );
        let outcome = apply_enhancements(report, &[medium, high]);

        assert_eq!(outcome.report, "Revenue grew 34% in 2023 across all regions.");
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.applications[0].task_id.as_str(), "h");
        assert_eq!(outcome.applications[1].mode, MatchMode::Unmatched);
        assert_eq!(outcome.unmatched()[0].as_str(), "m");
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let report = "alpha beta".to_string();
        let first = result("1", "alpha beta", "gamma", Priority::High);
        let second = result("2", "alpha", "delta", Priority::High);
        let outcome = apply_enhancements(report, &[first, second]);
        assert_eq!(outcome.report, "gamma");
        assert_eq!(outcome.applications[1].mode, MatchMode::Unmatched);
    }

    #[test]
    fn test_unmatched_leaves_report_intact() {
        let r = result("t1", "This sentence is absent.", "Replacement.", Priority::High);
        let outcome = apply_enhancements(REPORT.to_string(), &[r]);
        assert_eq!(outcome.report, REPORT);
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.unmatched().len(), 1);
    }

    #[test]
    fn test_blank_quote_never_inserts() {
        let (report, mode) = apply_one(REPORT.to_string(), "", "Injected.");
        assert_eq!(report, REPORT);
        assert_eq!(mode, MatchMode::Unmatched);

        let (report, mode) = apply_one(REPORT.to_string(), "  \n", "Injected.");
        assert_eq!(report, REPORT);
        assert_eq!(mode, MatchMode::Unmatched);
    }

    #[test]
    fn test_failed_result_is_no_op() {
        let task = EnhancementTask::new("t1", "Revenue grew significantly.", Priority::High);
        let failed = EnhancementResult::failed(&task, "Overloaded (HTTP 503): busy");
        let outcome = apply_enhancements(REPORT.to_string(), &[failed]);
        assert_eq!(outcome.report, REPORT);
        assert_eq!(outcome.applied, 0);
    }

    #[test]
    fn test_mixed_results_counts() {
        let report = "One is vague. Two is vague. Three is vague.".to_string();
        let results = vec![
            result("1", "One is vague.", "One is 1.", Priority::Low),
            result("2", "Two  is vague.", "Two is 2.", Priority::High),
            result("3", "Three is vague.", "Three is vague.", Priority::Medium),
            result("4", "Four is vague.", "Four is 4.", Priority::High),
        ];
        let outcome = apply_enhancements(report, &results);
        assert_eq!(outcome.report, "One is 1. Two is 2. Three is vague.");
        assert_eq!(outcome.applied, 2);

        let order: Vec<(&str, MatchMode)> = outcome
            .applications
            .iter()
            .map(|a| (a.task_id.as_str(), a.mode))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2", MatchMode::Normalized),
                ("4", MatchMode::Unmatched),
                ("3", MatchMode::Unchanged),
                ("1", MatchMode::Exact),
            ]
        );
    }
}
