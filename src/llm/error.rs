//! Generation error types with retry classification.
//!
//! Distinguishes between transient errors (overloaded / rate limited, retried by
//! [`with_retry`](super::with_retry)) and permanent errors (propagated immediately).

/// Error from a generation call.
#[derive(Debug, Clone)]
pub struct LlmError {
    /// The kind of error
    pub kind: LlmErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
}

impl LlmError {
    /// Build an error from an HTTP status and response body.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: classify_http_status(status_code),
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Create an overloaded error (503).
    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::from_status(503, message)
    }

    /// Create a rate limit error (429).
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::from_status(429, message)
    }

    /// Create a client error (bad request, auth, etc.).
    pub fn client_error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::NetworkError,
            status_code: None,
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Timeout,
            status_code: None,
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            status_code: None,
            message: message.into(),
        }
    }

    /// Classify this error for the retry wrapper.
    ///
    /// The status code wins when present; otherwise the message is searched for
    /// `"overloaded"` / `"503"` and then `"rate limit"` (case-insensitive).
    pub fn retry_class(&self) -> RetryClass {
        match self.status_code {
            Some(503) => return RetryClass::Overloaded,
            Some(429) => return RetryClass::RateLimited,
            _ => {}
        }

        let message = self.message.to_lowercase();
        if message.contains("overloaded") || message.contains("503") {
            RetryClass::Overloaded
        } else if message.contains("rate limit") {
            RetryClass::RateLimited
        } else {
            RetryClass::Permanent
        }
    }

    /// Check if this error is transient and should be retried.
    pub fn is_transient(&self) -> bool {
        self.retry_class() != RetryClass::Permanent
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

/// Classification of generation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Backend overloaded (503)
    Overloaded,
    /// Rate limited (429)
    RateLimited,
    /// Other server error (500, 502, 504, ...)
    ServerError,
    /// Client error (400, 401, 403, 404) - validation, auth, malformed request
    ClientError,
    /// Connection failed
    NetworkError,
    /// Per-call timeout elapsed
    Timeout,
    /// Response body could not be interpreted
    ParseError,
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmErrorKind::Overloaded => write!(f, "Overloaded"),
            LlmErrorKind::RateLimited => write!(f, "Rate limited"),
            LlmErrorKind::ServerError => write!(f, "Server error"),
            LlmErrorKind::ClientError => write!(f, "Client error"),
            LlmErrorKind::NetworkError => write!(f, "Network error"),
            LlmErrorKind::Timeout => write!(f, "Timeout"),
            LlmErrorKind::ParseError => write!(f, "Parse error"),
        }
    }
}

/// How the retry wrapper treats an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Retry after `base × 2^attempt`
    Overloaded,
    /// Retry after `base × 2^attempt × 2`
    RateLimited,
    /// Propagate immediately
    Permanent,
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        503 => LlmErrorKind::Overloaded,
        429 => LlmErrorKind::RateLimited,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}
