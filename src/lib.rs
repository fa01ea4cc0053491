//! # Report Enhancer
//!
//! Master/sub-agent pipeline that backs weak claims in an analytical report
//! with facts taken from a source transcript and reference documents.
//!
//! This library provides:
//! - A generation client boundary with an OpenRouter implementation
//! - Deterministic retry for overloaded and rate-limited backends
//! - Task identification, concurrent sub-agents and quote substitution
//! - Progress events for observers
//!
//! ## Architecture
//!
//! ```text
//!        ┌──────────────────────────────────┐
//!        │           Orchestrator           │
//!        └────────────────┬─────────────────┘
//!                         │
//!                         ▼
//!                ┌─────────────────┐
//!                │ TaskIdentifier  │  (1 call, JSON plan)
//!                └────────┬────────┘
//!                         │ high priority only
//!           ┌─────────────┼─────────────┐
//!           ▼             ▼             ▼
//!      ┌─────────┐   ┌─────────┐   ┌─────────┐
//!      │SubAgent │   │SubAgent │   │SubAgent │  (concurrent)
//!      └────┬────┘   └────┬────┘   └────┬────┘
//!           └─────────────┼─────────────┘
//!                         ▼
//!                ┌─────────────────┐
//!                │  Substitution   │  (sequential, by priority)
//!                └─────────────────┘
//! ```
//!
//! ## Modules
//! - `agents`: identifier, sub-agents, orchestrator and events
//! - `llm`: generation client, errors and retry
//! - `task`: tasks, results and plan parsing
//! - `substitution`: quote replacement with whitespace-tolerant matching
//! - `config`: environment configuration

pub mod agents;
pub mod config;
pub mod llm;
pub mod substitution;
pub mod task;

pub use agents::{EnhancementContext, EnhancementEvent, EnhancementOutcome, Orchestrator};
pub use config::Config;
pub use llm::{GenerationClient, OpenRouterClient, ReferenceDocument};
