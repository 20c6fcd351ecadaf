//! Google Gemini backend

use super::error::TransportError;
use super::types::{BackendReply, CompletionRequest, Provider};
use super::CompletionBackend;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiBackend {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(client: Client, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    /// The key travels in a header so it never appears in the request URL
    fn build_request(&self, model: &str, request: &CompletionRequest) -> RequestBuilder {
        let builder = self
            .client
            .post(self.endpoint(model))
            .json(&Self::translate_request(request));
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    fn translate_request(request: &CompletionRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            system_instruction: (!request.system_prompt.is_empty()).then(|| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(request.system_prompt.clone()),
                }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.params.temperature,
                top_p: request.params.top_p,
            },
        }
    }

    /// `candidates[0].content.parts[0].text`, if present
    fn extract_text(body: &str) -> Option<String> {
        let response: GeminiResponse = serde_json::from_str(body).ok()?;
        response
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn send(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<BackendReply, TransportError> {
        let response = self.build_request(model, request).send().await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response: {e}")))?;

        if status.is_success() {
            return Ok(BackendReply {
                status: status.as_u16(),
                completion: Self::extract_text(&body),
                error_message: None,
            });
        }

        let message = serde_json::from_str::<GeminiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| super::truncate_body(&body));
        Ok(BackendReply::status(status.as_u16(), message))
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
