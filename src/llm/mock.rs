//! In-memory generation client for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationClient, GenerationRequest, GenerationResponse, LlmError};

type Responder =
    Box<dyn Fn(&GenerationRequest, usize) -> Result<GenerationResponse, LlmError> + Send + Sync>;

/// Client that answers each call through a closure and records every request.
///
/// The closure receives the request and the zero-based call index.
pub(crate) struct ScriptedClient {
    responder: Responder,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&GenerationRequest, usize) -> Result<GenerationResponse, LlmError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client that always returns the same text.
    pub(crate) fn always(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(GenerationResponse::text(text.clone())))
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.responder)(request, index)
    }
}

/// Concatenated text parts of a request, for matching in responders.
pub(crate) fn request_text(request: &GenerationRequest) -> String {
    request
        .contents
        .iter()
        .filter_map(|p| p.as_text())
        .collect::<Vec<_>>()
        .join("\n")
}
