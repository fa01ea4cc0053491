//! Task plan produced by the identifier, and the eligibility filter.
//!
//! Backend output is loosely structured JSON. Parsing never fails hard: no JSON
//! object means "no plan", and malformed task entries are dropped one by one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EnhancementTask, Priority, TaskId};

/// Parsed output of one identification call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPlan {
    /// Short summary of how the report should be strengthened
    pub overall_strategy: String,
    /// Count reported by the backend (may differ from `tasks.len()`)
    pub total_tasks: usize,
    pub tasks: Vec<EnhancementTask>,
}

impl TaskPlan {
    /// Parse the first JSON object found in `response`.
    ///
    /// Returns `None` when the response holds no JSON object. At most
    /// `max_tasks` tasks are kept, in response order.
    pub fn parse(response: &str, max_tasks: usize) -> Option<Self> {
        let json = extract_json_object(response)?;

        let overall_strategy = json["overallStrategy"]
            .as_str()
            .or_else(|| json["overall_strategy"].as_str())
            .unwrap_or("")
            .to_string();

        let raw_tasks = json["tasks"]
            .as_array()
            .or_else(|| json["enhancementTasks"].as_array())
            .cloned()
            .unwrap_or_default();

        let mut tasks: Vec<EnhancementTask> = raw_tasks
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| parse_task(raw, i))
            .collect();
        dedupe_task_ids(&mut tasks);

        if tasks.len() > max_tasks {
            tracing::debug!(
                "Identifier returned {} tasks, keeping the first {}",
                tasks.len(),
                max_tasks
            );
            tasks.truncate(max_tasks);
        }

        let total_tasks = json["totalTasks"]
            .as_u64()
            .or_else(|| json["total_tasks"].as_u64())
            .map(|n| n as usize)
            .unwrap_or(tasks.len());

        Some(Self {
            overall_strategy,
            total_tasks,
            tasks,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks whose quote no longer appears verbatim in `report`.
    pub fn unverifiable_quotes<'a>(&'a self, report: &str) -> Vec<&'a EnhancementTask> {
        self.tasks
            .iter()
            .filter(|t| !t.is_quote_verbatim(report))
            .collect()
    }
}

/// Select the tasks worth a sub-agent call: the high-priority tier only.
pub fn eligible_tasks(tasks: &[EnhancementTask]) -> Vec<EnhancementTask> {
    tasks
        .iter()
        .filter(|t| t.priority == Priority::High)
        .cloned()
        .collect()
}

/// Give repeated ids a numeric suffix so ids stay unique within a plan.
fn dedupe_task_ids(tasks: &mut [EnhancementTask]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(tasks.len());
    for task in tasks.iter_mut() {
        let base = task.task_id.as_str().to_string();
        let mut candidate = base.clone();
        let mut n = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        if candidate != base {
            tracing::debug!("Renamed duplicate task id '{}' to '{}'", base, candidate);
            task.task_id = TaskId::new(candidate);
        }
    }
}

fn parse_task(raw: &Value, index: usize) -> Option<EnhancementTask> {
    let field = |camel: &str, snake: &str| -> String {
        raw[camel]
            .as_str()
            .or_else(|| raw[snake].as_str())
            .unwrap_or("")
            .to_string()
    };

    let original_quote = field("originalQuote", "original_quote");
    if original_quote.trim().is_empty() {
        tracing::warn!("Dropping identified task #{} without a quote", index + 1);
        return None;
    }

    let task_id = match field("taskId", "task_id") {
        id if id.trim().is_empty() => TaskId::synthesized(index),
        id => TaskId::new(id),
    };

    let sources = raw
        .get("dataSourcesNeeded")
        .or_else(|| raw.get("data_sources_needed"));
    let data_sources_needed = match sources {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    };

    Some(EnhancementTask {
        task_id,
        research_task: field("researchTask", "research_task"),
        original_quote,
        enhancement_focus: field("enhancementFocus", "enhancement_focus"),
        expected_improvement: field("expectedImprovement", "expected_improvement"),
        priority: Priority::parse_lenient(&field("priority", "priority")),
        data_sources_needed,
    })
}

/// Find the first well-formed JSON object in free-form model output.
///
/// Every `{` is tried in order and the first position from which a complete
/// object parses wins. Objects inside markdown fences are found the same way.
pub fn extract_json_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value @ Value::Object(_))) => Some(value),
            _ => None,
        }
    })
}
