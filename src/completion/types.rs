//! Common types for completion requests

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Remote completion provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    OpenRouter,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Candidate list used when none is configured, in fallback order
    pub fn default_models(self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"],
            Provider::OpenRouter => &[
                "google/gemini-2.0-flash-exp:free",
                "meta-llama/llama-3.3-70b-instruct:free",
                "mistralai/mistral-7b-instruct:free",
            ],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openrouter" => Ok(Provider::OpenRouter),
            other => Err(format!("unknown provider '{other}' (expected gemini or openrouter)")),
        }
    }
}

/// Fixed sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
        }
    }
}

/// One prompt with its system instruction
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub params: GenerationParams,
}

/// What a backend got back over HTTP, before classification
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    /// Extracted completion text, if the body had one
    pub completion: Option<String>,
    /// Provider error message for non-success statuses
    pub error_message: Option<String>,
}

impl BackendReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: 200,
            completion: Some(text.into()),
            error_message: None,
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            completion: None,
            error_message: Some(message.into()),
        }
    }
}

/// Provider settings resolved from the environment
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Candidate models, tried in order
    pub models: Vec<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub params: GenerationParams,
}

impl CompletionConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        let provider = Provider::default();
        Self {
            provider,
            api_key: None,
            models: provider
                .default_models()
                .iter()
                .map(ToString::to_string)
                .collect(),
            base_url: None,
            timeout: Duration::from_secs(60),
            params: GenerationParams::default(),
        }
    }
}
