//! Completion error types
//!
//! Three levels: [`TransportError`] is what a backend returns when no HTTP
//! response arrived at all, [`AttemptError`] is a soft per-model failure that
//! only advances the fallback loop, and [`CompletionError`] is what the
//! caller of `complete` sees.

use thiserror::Error;

/// No HTTP response was obtained (DNS, connect, timeout, broken body)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The URL is stripped because it can carry credentials in its query.
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            Self::new(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::new(format!("Connection failed: {e}"))
        } else {
            Self::new(format!("Request failed: {e}"))
        }
    }
}

/// Classification of a soft, per-candidate failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptErrorKind {
    /// Success status but no usable completion text
    MalformedResponse,
    /// 429, 400 or 404: throttled, or the model id is not served
    RateLimitedOrInvalidModel,
}

/// A candidate failed in a way that lets the next candidate be tried
#[derive(Debug, Clone, Error)]
#[error("{model}: {message}")]
pub struct AttemptError {
    pub model: String,
    pub kind: AttemptErrorKind,
    pub status: u16,
    pub message: String,
}

/// Failure of a whole `complete` call
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("No network connectivity")]
    NoConnectivity,
    #[error("No candidate models configured")]
    NoCandidates,
    #[error("Network error while calling {model}: {message}")]
    Network { model: String, message: String },
    #[error("Provider error from {model} (HTTP {status}): {message}")]
    FatalProvider {
        model: String,
        status: u16,
        message: String,
    },
    #[error("All {attempts} candidate models failed; last error: {last}")]
    AllModelsFailed { attempts: usize, last: AttemptError },
}

impl CompletionError {
    /// Short stable name for logs and API payloads
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::NoConnectivity => "no_connectivity",
            CompletionError::NoCandidates => "no_candidates",
            CompletionError::Network { .. } => "network_error",
            CompletionError::FatalProvider { .. } => "fatal_provider_error",
            CompletionError::AllModelsFailed { .. } => "all_models_failed",
        }
    }
}
