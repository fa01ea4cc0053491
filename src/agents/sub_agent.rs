//! Sub-agent executor - one generation call per eligible task.
//!
//! Never fails: any error after retries becomes a result whose content is the
//! original quote, so applying it is a no-op. The shared report is only read.

use std::sync::OnceLock;

use regex::Regex;

use crate::llm::{GenerationRequest, ReferenceDocument};
use crate::task::{EnhancementResult, EnhancementTask};

use super::prompts;
use super::EnhancementContext;

/// Read-only material handed to every sub-agent of a run.
#[derive(Debug, Clone, Copy)]
pub struct SourceMaterial<'a> {
    pub report: &'a str,
    pub transcript: &'a str,
    pub documents: &'a [ReferenceDocument],
}

/// Produces a replacement fragment for one task.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubAgent;

impl SubAgent {
    pub fn new() -> Self {
        Self
    }

    fn build_request(
        &self,
        task: &EnhancementTask,
        material: &SourceMaterial<'_>,
        ctx: &EnhancementContext,
    ) -> GenerationRequest {
        GenerationRequest::new(
            ctx.model.clone(),
            prompts::SUB_AGENT_SYSTEM,
            prompts::sub_agent_parts(task, material.report, material.transcript, material.documents),
        )
        .with_reasoning(ctx.sub_agent_effort)
        .with_grounding_store(ctx.grounding_store.clone())
    }

    /// Execute one task.
    pub async fn execute(
        &self,
        task: &EnhancementTask,
        material: &SourceMaterial<'_>,
        ctx: &EnhancementContext,
    ) -> EnhancementResult {
        let request = self.build_request(task, material, ctx);

        match ctx.generate(&request).await {
            Ok(response) => {
                let content = clean_fragment(&response.text, &task.original_quote);
                let result = EnhancementResult::enhanced(task, content);
                if result.is_modified() {
                    tracing::debug!(task_id = %task.task_id, "Sub-agent produced a replacement");
                } else {
                    tracing::debug!(task_id = %task.task_id, "Sub-agent found no supporting data");
                }
                result
            }
            Err(e) => {
                tracing::warn!(
                    task_id = %task.task_id,
                    "Sub-agent failed, keeping original quote: {}",
                    e
                );
                EnhancementResult::failed(task, e.to_string())
            }
        }
    }
}

fn code_fence() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```$").ok())
        .as_ref()
}

/// Strip wrappers models tend to add around a bare fragment.
///
/// An echo of the quote (ignoring outer whitespace) returns the quote byte for
/// byte. Wrappers the quote itself carries are left alone, and a replacement
/// gets the quote's outer whitespace back so it splices cleanly.
fn clean_fragment(raw: &str, original_quote: &str) -> String {
    let quote = original_quote.trim();
    let mut text = raw.trim();
    if text == quote {
        return original_quote.to_string();
    }

    if !quote.starts_with("```") {
        if let Some(inner) = code_fence()
            .and_then(|re| re.captures(text))
            .and_then(|c| c.get(1))
        {
            text = inner.as_str().trim();
        }
    }

    for (open, close) in [("\"", "\""), ("“", "”"), ("'", "'")] {
        if text.len() >= open.len() + close.len() && text.starts_with(open) && text.ends_with(close) {
            if quote.starts_with(open) && quote.ends_with(close) {
                break;
            }
            let inner = &text[open.len()..text.len() - close.len()];
            // Only unwrap a single outer pair; inner quotes stay.
            if !inner.contains(open) && !inner.contains(close) {
                text = inner.trim();
            }
            break;
        }
    }

    if text == quote {
        return original_quote.to_string();
    }
    if text.is_empty() {
        return String::new();
    }

    let leading = &original_quote[..original_quote.len() - original_quote.trim_start().len()];
    let trailing = &original_quote[original_quote.trim_end().len()..];
    format!("{}{}{}", leading, text, trailing)
}
