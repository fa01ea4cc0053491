//! Orchestrator - sequences one enhancement run.
//!
//! # Run Flow
//! ```text
//! Idle -> Identifying -> NoTasks ---------------------------> Done
//!                     -> Filtering -> NoEligible -----------> Done
//!                                  -> Executing -> Substituting -> Done
//! ```
//!
//! Identification failure or an empty plan ends the run with the original
//! report. Executing and Substituting always complete: sub-agent failures are
//! folded into their results and unmatched quotes are skipped.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::llm::ReferenceDocument;
use crate::substitution::{apply_enhancements, SubstitutionOutcome};
use crate::task::{eligible_tasks, EnhancementResult, EnhancementTask};

use super::events::EnhancementEvent;
use super::identifier::TaskIdentifier;
use super::sub_agent::{SourceMaterial, SubAgent};
use super::EnhancementContext;

/// Errors surfaced to the caller of a run.
///
/// Everything else degrades to returning the best available report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no report text supplied")]
    EmptyReport,
}

/// Stage of a run, used for transition logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Identifying,
    Filtering,
    Executing,
    Substituting,
    Done,
}

/// Which terminal path a run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The identifier call failed; report returned unchanged
    IdentificationFailed,
    /// No parsable or non-empty task list; report returned unchanged
    NoTasks,
    /// Tasks found but none of high priority; report returned unchanged
    NoEligibleTasks,
    /// Sub-agents ran and substitution was applied
    Enhanced,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementOutcome {
    /// Final report text (the input when nothing was applied)
    pub report: String,
    pub run_id: Uuid,
    pub completion: Completion,
    /// Identifier's overall strategy, if a plan was produced
    pub strategy: Option<String>,
    /// Every identified task, all priorities
    pub tasks: Vec<EnhancementTask>,
    /// One result per executed task, in dispatch order
    pub results: Vec<EnhancementResult>,
    pub substitution: Option<SubstitutionOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl EnhancementOutcome {
    fn unchanged(report: &str, run_id: Uuid, completion: Completion, started_at: DateTime<Utc>) -> Self {
        Self {
            report: report.to_string(),
            run_id,
            completion,
            strategy: None,
            tasks: Vec::new(),
            results: Vec::new(),
            substitution: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Number of replacements spliced into the report.
    pub fn applied(&self) -> usize {
        self.substitution.as_ref().map_or(0, |s| s.applied)
    }
}

/// Master agent of the enhancement pipeline.
///
/// # Example
/// ```ignore
/// let orchestrator = Orchestrator::new(EnhancementContext::new(&config, client));
/// let report = orchestrator.enhance_report(&draft, &transcript, &[]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Orchestrator {
    ctx: EnhancementContext,
    identifier: TaskIdentifier,
    sub_agent: SubAgent,
}

impl Orchestrator {
    pub fn new(ctx: EnhancementContext) -> Self {
        Self {
            ctx,
            identifier: TaskIdentifier::new(),
            sub_agent: SubAgent::new(),
        }
    }

    pub fn context(&self) -> &EnhancementContext {
        &self.ctx
    }

    /// Run the pipeline and return only the final report text.
    pub async fn enhance_report(
        &self,
        report: &str,
        transcript: &str,
        documents: &[ReferenceDocument],
    ) -> Result<String, PipelineError> {
        Ok(self.enhance(report, transcript, documents).await?.report)
    }

    /// Run the pipeline.
    ///
    /// Fails only when `report` is blank.
    pub async fn enhance(
        &self,
        report: &str,
        transcript: &str,
        documents: &[ReferenceDocument],
    ) -> Result<EnhancementOutcome, PipelineError> {
        if report.trim().is_empty() {
            return Err(PipelineError::EmptyReport);
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("enhancement_run", %run_id);
        let material = SourceMaterial {
            report,
            transcript,
            documents,
        };
        Ok(self.run(run_id, material).instrument(span).await)
    }

    async fn run(&self, run_id: Uuid, material: SourceMaterial<'_>) -> EnhancementOutcome {
        let started_at = Utc::now();
        let report = material.report;
        let mut stage = RunStage::Idle;

        advance(&mut stage, RunStage::Identifying);
        self.ctx.emit(EnhancementEvent::Identifying {
            report_chars: report.chars().count(),
        });

        let plan = match self.identifier.identify(report, &self.ctx).await {
            Ok(Some(plan)) if !plan.is_empty() => plan,
            Ok(_) => {
                tracing::info!("No enhancement tasks identified; returning original report");
                advance(&mut stage, RunStage::Done);
                return EnhancementOutcome::unchanged(report, run_id, Completion::NoTasks, started_at);
            }
            Err(e) => {
                tracing::error!("Task identification failed, returning original report: {}", e);
                advance(&mut stage, RunStage::Done);
                return EnhancementOutcome::unchanged(
                    report,
                    run_id,
                    Completion::IdentificationFailed,
                    started_at,
                );
            }
        };

        self.ctx.emit(EnhancementEvent::Tasks {
            tasks: plan.tasks.clone(),
            overall_strategy: plan.overall_strategy.clone(),
        });

        advance(&mut stage, RunStage::Filtering);
        let eligible = eligible_tasks(&plan.tasks);
        if eligible.is_empty() {
            tracing::info!(
                "None of {} tasks is high priority; returning original report",
                plan.tasks.len()
            );
            advance(&mut stage, RunStage::Done);
            return EnhancementOutcome {
                strategy: Some(plan.overall_strategy),
                tasks: plan.tasks,
                ..EnhancementOutcome::unchanged(report, run_id, Completion::NoEligibleTasks, started_at)
            };
        }

        advance(&mut stage, RunStage::Executing);
        tracing::info!(
            "Dispatching {} of {} tasks to sub-agents",
            eligible.len(),
            plan.tasks.len()
        );
        for task in &eligible {
            self.ctx.emit(EnhancementEvent::TaskStarted { task: task.clone() });
        }
        let results = join_all(eligible.iter().map(|task| self.execute_task(task, &material))).await;

        let failed = results.iter().filter(|r| r.is_failure()).count();
        if failed > 0 {
            tracing::warn!("{} of {} sub-agents failed", failed, results.len());
        }

        advance(&mut stage, RunStage::Substituting);
        let substitution = apply_enhancements(report.to_string(), &results);
        tracing::info!(
            "Applied {} of {} enhancements ({} unmatched)",
            substitution.applied,
            results.len(),
            substitution.unmatched().len()
        );
        self.ctx.emit(EnhancementEvent::Enhancements {
            results: results.clone(),
            substitution: substitution.clone(),
        });

        advance(&mut stage, RunStage::Done);
        EnhancementOutcome {
            report: substitution.report.clone(),
            run_id,
            completion: Completion::Enhanced,
            strategy: Some(plan.overall_strategy),
            tasks: plan.tasks,
            results,
            substitution: Some(substitution),
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn execute_task(
        &self,
        task: &EnhancementTask,
        material: &SourceMaterial<'_>,
    ) -> EnhancementResult {
        self.ctx.emit(EnhancementEvent::SubtaskStarted { task: task.clone() });
        let result = self.sub_agent.execute(task, material, &self.ctx).await;
        self.ctx.emit(EnhancementEvent::SubtaskCompleted {
            result: result.clone(),
        });
        result
    }
}

fn advance(stage: &mut RunStage, next: RunStage) {
    tracing::debug!("Stage {:?} -> {:?}", stage, next);
    *stage = next;
}
