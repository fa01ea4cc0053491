//! Generation client module for interacting with language models.
//!
//! This module provides a trait-based abstraction over text-generation backends,
//! with OpenRouter as the primary implementation. The core treats the backend as
//! opaque: a request goes in, fully materialized text comes out.

mod error;
mod openrouter;
mod retry;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{classify_http_status, LlmError, LlmErrorKind, RetryClass};
pub use openrouter::OpenRouterClient;
pub use retry::{with_retry, RetryPolicy};

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A reference document passed through to the backend as context.
///
/// The pipeline never inspects the content of these documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceDocument {
    /// Uploaded or hosted file, referenced by URI.
    File {
        #[serde(rename = "mimeType")]
        mime_type: String,
        uri: String,
    },
    /// Inline text document.
    Inline {
        #[serde(rename = "displayName")]
        display_name: String,
        content: String,
    },
}

impl ReferenceDocument {
    /// Create a file reference.
    pub fn file(mime_type: impl Into<String>, uri: impl Into<String>) -> Self {
        ReferenceDocument::File {
            mime_type: mime_type.into(),
            uri: uri.into(),
        }
    }

    /// Create an inline text document.
    pub fn inline(display_name: impl Into<String>, content: impl Into<String>) -> Self {
        ReferenceDocument::Inline {
            display_name: display_name.into(),
            content: content.into(),
        }
    }

    /// Load a local text file as an inline document named after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self::inline(display_name, content))
    }

    /// Convert into a request content part.
    pub fn to_part(&self) -> ContentPart {
        match self {
            ReferenceDocument::File { mime_type, uri } => ContentPart::file(mime_type, uri),
            ReferenceDocument::Inline {
                display_name,
                content,
            } => ContentPart::text(format!("=== {} ===\n{}", display_name, content)),
        }
    }
}

/// Content part of a generation request (text or opaque file reference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text segment
    Text { text: String },
    /// Opaque file reference
    File { mime_type: String, uri: String },
}

impl ContentPart {
    /// Create a text content part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Create a file content part.
    pub fn file(mime_type: impl Into<String>, uri: impl Into<String>) -> Self {
        ContentPart::File {
            mime_type: mime_type.into(),
            uri: uri.into(),
        }
    }

    /// Get the text of this part, if it is a text segment.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::File { .. } => None,
        }
    }
}

/// Reasoning budget requested from "thinking" models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
    /// Explicit thinking-token budget.
    Budget(u32),
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => other
                .parse::<u32>()
                .map(Self::Budget)
                .map_err(|_| format!("expected low|medium|high or a token budget, got '{}'", s)),
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    /// Model identifier (backend format)
    pub model: String,
    /// System instruction
    pub system_instruction: String,
    /// User content parts, in order
    pub contents: Vec<ContentPart>,
    /// Optional reasoning budget
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Optional grounding/reference store the backend may consult
    pub grounding_store: Option<String>,
}

impl GenerationRequest {
    /// Create a request with no reasoning budget and no grounding store.
    pub fn new(
        model: impl Into<String>,
        system_instruction: impl Into<String>,
        contents: Vec<ContentPart>,
    ) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
            contents,
            reasoning_effort: None,
            grounding_store: None,
        }
    }

    /// Set the reasoning budget.
    pub fn with_reasoning(mut self, effort: Option<ReasoningEffort>) -> Self {
        self.reasoning_effort = effort;
        self
    }

    /// Set the grounding store.
    pub fn with_grounding_store(mut self, store: Option<String>) -> Self {
        self.grounding_store = store;
        self
    }
}

/// Token usage information (if provided by the upstream provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a usage object ensuring `total_tokens` is consistent.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Fully materialized response from a generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub model: Option<String>,
}

impl GenerationResponse {
    /// Response carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
            model: None,
        }
    }
}

/// Trait for generation backends.
///
/// Implementations perform exactly one call per invocation; retries are applied
/// by the caller through [`with_retry`].
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send a generation request.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError>;
}
