//! Prompt text for the identifier and sub-agent calls.

use crate::llm::{ContentPart, ReferenceDocument};
use crate::task::EnhancementTask;

pub const IDENTIFIER_SYSTEM: &str = "You are a meticulous research editor. You find claims in \
analytical reports that lack quantifiable support. Respond only with JSON.";

pub const SUB_AGENT_SYSTEM: &str = "You are a research sub-agent. You rewrite one excerpt of a \
report using only facts present in the provided materials. Return only the replacement text.";

/// Build the identifier's user content.
pub fn identifier_parts(report: &str, max_tasks: usize) -> Vec<ContentPart> {
    let instructions = format!(
        r#"Read the ENTIRE report below and find up to {max_tasks} claims that lack quantifiable support
(vague growth, unsized markets, unnamed competitors, unquantified traction, and similar).

For each claim return a task:
- "taskId": short unique id
- "researchTask": what data is missing
- "originalQuote": the claim copied VERBATIM from the report, 50-150 characters,
  character-for-character identical so it can be found by exact substring search
- "enhancementFocus": the kind of data needed
- "expectedImprovement": why the change strengthens the report
- "priority": "high", "medium" or "low"
- "dataSourcesNeeded": list of source types to consult

Respond with a JSON object:
{{
    "overallStrategy": "one or two sentences",
    "totalTasks": <number of tasks>,
    "tasks": [ ... ]
}}

If nothing needs enhancement, return an empty "tasks" array."#,
        max_tasks = max_tasks
    );

    vec![
        ContentPart::text(instructions),
        ContentPart::text(format!("=== REPORT ===\n{}", report)),
    ]
}

/// Build the sub-agent's user content for one task.
pub fn sub_agent_parts(
    task: &EnhancementTask,
    report: &str,
    transcript: &str,
    documents: &[ReferenceDocument],
) -> Vec<ContentPart> {
    let sources = if task.data_sources_needed.is_empty() {
        "any provided material".to_string()
    } else {
        task.data_sources_needed.join(", ")
    };

    let instructions = format!(
        r#"RESEARCH GOAL: {goal}
FOCUS: {focus}
SUGGESTED SOURCES: {sources}

ORIGINAL QUOTE:
"""
{quote}
"""

Rewrite the original quote so it carries the missing data. Rules:
1. Only add facts found in the transcript, the reference documents or the report itself.
2. Never add opinions, judgments or speculation.
3. Keep the sentence structure and tone of the original.
4. Return ONLY the replacement text, with no preamble, quotes or markdown fences.
5. If the materials contain no supporting data, return the original quote unchanged."#,
        goal = task.research_task,
        focus = task.enhancement_focus,
        sources = sources,
        quote = task.original_quote,
    );

    let mut parts = vec![
        ContentPart::text(instructions),
        ContentPart::text(format!("=== REPORT (context) ===\n{}", report)),
    ];
    if !transcript.trim().is_empty() {
        parts.push(ContentPart::text(format!("=== TRANSCRIPT ===\n{}", transcript)));
    }
    parts.extend(documents.iter().map(ReferenceDocument::to_part));
    parts
}
