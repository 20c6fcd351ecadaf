//! Remote completion client
//!
//! Sends a prompt to an ordered list of candidate models on one provider,
//! one request at a time, falling back to the next candidate on soft
//! failures and stopping at the first call-fatal one.

mod connectivity;
mod error;
mod gemini;
mod openrouter;
mod policy;
mod types;

#[cfg(test)]
pub mod testing;

pub use connectivity::{ConnectivityProbe, DnsProbe};
pub use error::{AttemptError, AttemptErrorKind, CompletionError, TransportError};
pub use gemini::GeminiBackend;
pub use openrouter::OpenRouterBackend;
pub use policy::FallbackPolicy;
pub use types::{BackendReply, CompletionConfig, CompletionRequest, GenerationParams, Provider};

use async_trait::async_trait;
use std::ops::ControlFlow;
use std::sync::Arc;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// One provider's wire protocol
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issue a single request to `model`. Any HTTP response, including error
    /// statuses, is `Ok`; `Err` means no response was obtained.
    async fn send(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<BackendReply, TransportError>;

    fn provider(&self) -> Provider;
}

/// Logging wrapper for completion backends
pub struct LoggingBackend {
    inner: Arc<dyn CompletionBackend>,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn CompletionBackend>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CompletionBackend for LoggingBackend {
    async fn send(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<BackendReply, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(model, request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) if (200..300).contains(&reply.status) => {
                tracing::info!(
                    provider = %self.inner.provider(),
                    model = %model,
                    duration_ms = %duration.as_millis(),
                    has_text = reply.completion.is_some(),
                    "Completion request completed"
                );
            }
            Ok(reply) => {
                tracing::warn!(
                    provider = %self.inner.provider(),
                    model = %model,
                    duration_ms = %duration.as_millis(),
                    status = reply.status,
                    error = reply.error_message.as_deref().unwrap_or(""),
                    "Completion request rejected"
                );
            }
            Err(e) => {
                tracing::error!(
                    provider = %self.inner.provider(),
                    model = %model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "Completion request failed"
                );
            }
        }

        result
    }

    fn provider(&self) -> Provider {
        self.inner.provider()
    }
}

/// Sequential multi-model completion client
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
    probe: Arc<dyn ConnectivityProbe>,
    models: Vec<String>,
    params: GenerationParams,
}

impl CompletionClient {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        probe: Arc<dyn ConnectivityProbe>,
        models: Vec<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            backend,
            probe,
            models,
            params,
        }
    }

    /// Build the configured provider backend over a shared HTTP client
    pub fn from_config(config: &CompletionConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let base_url = config.base_url();

        let backend: Arc<dyn CompletionBackend> = match config.provider {
            Provider::Gemini => Arc::new(GeminiBackend::new(
                http,
                config.api_key.clone(),
                base_url,
            )),
            Provider::OpenRouter => Arc::new(OpenRouterBackend::new(
                http,
                config.api_key.clone(),
                base_url,
            )),
        };

        let probe: Arc<dyn ConnectivityProbe> = match DnsProbe::for_base_url(base_url) {
            Some(probe) => Arc::new(probe),
            None => {
                tracing::warn!(base_url = %base_url, "Base URL has no host; probing localhost");
                Arc::new(DnsProbe::new("localhost", 80))
            }
        };

        Ok(Self::new(
            Arc::new(LoggingBackend::new(backend)),
            probe,
            config.models.clone(),
            config.params,
        ))
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn provider(&self) -> Provider {
        self.backend.provider()
    }

    /// Complete `prompt` under `system_prompt`, trying candidates in order
    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<String, CompletionError> {
        if !self.probe.is_online().await {
            return Err(CompletionError::NoConnectivity);
        }

        let request = CompletionRequest {
            system_prompt: system_prompt.to_string(),
            prompt: prompt.to_string(),
            params: self.params,
        };

        let mut policy = FallbackPolicy::new();
        for model in &self.models {
            let outcome = self.backend.send(model, &request).await;
            if let ControlFlow::Break(result) = policy.step(model, outcome) {
                if let Err(e) = &result {
                    tracing::error!(model = %model, attempts = policy.attempts(), kind = e.kind(), error = %e, "Completion aborted");
                }
                return result;
            }
        }

        let error = policy.exhausted();
        tracing::error!(kind = error.kind(), error = %error, "Completion failed");
        Err(error)
    }
}

/// First part of an unparseable error body, for diagnostics
fn truncate_body(body: &str) -> String {
    let mut chars = body.chars();
    let preview: String = chars.by_ref().take(ERROR_BODY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}
