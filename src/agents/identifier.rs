//! Task identifier - one call that turns the report into a prioritized task plan.

use crate::llm::{GenerationRequest, LlmError};
use crate::task::TaskPlan;

use super::prompts;
use super::EnhancementContext;

/// Finds claims that need factual backing.
///
/// # Outcome
/// - `Ok(Some(plan))`: the response held a JSON object (the plan may be empty)
/// - `Ok(None)`: no parsable JSON; means "no enhancement needed"
/// - `Err(_)`: the generation call itself failed after retries
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskIdentifier;

impl TaskIdentifier {
    pub fn new() -> Self {
        Self
    }

    fn build_request(&self, report: &str, ctx: &EnhancementContext) -> GenerationRequest {
        GenerationRequest::new(
            ctx.model.clone(),
            prompts::IDENTIFIER_SYSTEM,
            prompts::identifier_parts(report, ctx.max_tasks),
        )
        .with_reasoning(ctx.identifier_effort)
        .with_grounding_store(ctx.grounding_store.clone())
    }

    /// Run identification against the full report.
    pub async fn identify(
        &self,
        report: &str,
        ctx: &EnhancementContext,
    ) -> Result<Option<TaskPlan>, LlmError> {
        let request = self.build_request(report, ctx);
        let response = ctx.generate(&request).await?;

        let Some(plan) = TaskPlan::parse(&response.text, ctx.max_tasks) else {
            tracing::info!(
                "Identifier response held no JSON object ({} chars); treating as no tasks",
                response.text.len()
            );
            return Ok(None);
        };

        for task in plan.unverifiable_quotes(report) {
            tracing::warn!(
                task_id = %task.task_id,
                "Identified quote is not a verbatim excerpt of the report: {:.80}",
                task.original_quote
            );
        }

        tracing::info!(
            "Identified {} tasks (backend reported {}): {}",
            plan.tasks.len(),
            plan.total_tasks,
            plan.overall_strategy
        );
        Ok(Some(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::mock::ScriptedClient;
    use crate::llm::{LlmErrorKind, ReasoningEffort, RetryPolicy};
    use std::sync::Arc;
    use std::time::Duration;

    fn context(client: Arc<ScriptedClient>) -> EnhancementContext {
        let mut config = Config::new("sk-test", "test/model");
        config.grounding_store = Some("store-1".to_string());
        EnhancementContext::new(&config, client)
            .with_retry(RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_identify_parses_plan() {
        let client = Arc::new(ScriptedClient::always(
            r#"{"overallStrategy":"quantify","tasks":[{"taskId":"t1","originalQuote":"grew a lot","priority":"high"}]}"#,
        ));
        let ctx = context(Arc::clone(&client));

        let plan = TaskIdentifier::new()
            .identify("Sales grew a lot.", &ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.overall_strategy, "quantify");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test/model");
        assert_eq!(requests[0].reasoning_effort, Some(ReasoningEffort::High));
        assert_eq!(requests[0].grounding_store.as_deref(), Some("store-1"));
        assert!(crate::llm::mock::request_text(&requests[0]).contains("Sales grew a lot."));
    }

    #[tokio::test]
    async fn test_identify_without_json_is_none() {
        let client = Arc::new(ScriptedClient::always("The report is already excellent."));
        let ctx = context(client);
        let plan = TaskIdentifier::new().identify("Report.", &ctx).await.unwrap();
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn test_identify_propagates_permanent_errors() {
        let client = Arc::new(ScriptedClient::new(|_, _| {
            Err(LlmError::client_error(401, "invalid key"))
        }));
        let ctx = context(Arc::clone(&client));
        let err = TaskIdentifier::new().identify("Report.", &ctx).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ClientError);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_identify_retries_transient_errors() {
        let client = Arc::new(ScriptedClient::new(|_, i| {
            if i == 0 {
                Err(LlmError::overloaded("busy"))
            } else {
                Ok(crate::llm::GenerationResponse::text(r#"{"tasks":[]}"#))
            }
        }));
        let ctx = context(Arc::clone(&client));
        let plan = TaskIdentifier::new().identify("Report.", &ctx).await.unwrap();
        assert!(plan.unwrap().is_empty());
        assert_eq!(client.calls(), 2);
    }
}
