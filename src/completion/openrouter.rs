//! `OpenRouter` backend (`OpenAI`-compatible chat completions)

use super::error::TransportError;
use super::types::{BackendReply, CompletionRequest, Provider};
use super::CompletionBackend;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenRouterBackend {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenRouterBackend {
    pub fn new(client: Client, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn translate_request<'a>(model: &'a str, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &request.system_prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model,
            messages,
            temperature: request.params.temperature,
            top_p: request.params.top_p,
        }
    }

    /// `choices[0].message.content`, if present
    fn extract_text(body: &str) -> Option<String> {
        let response: ChatResponse = serde_json::from_str(body).ok()?;
        response.choices.into_iter().next()?.message?.content
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn send(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<BackendReply, TransportError> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&Self::translate_request(model, request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
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

        let message = serde_json::from_str::<ChatErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| super::truncate_body(&body));
        Ok(BackendReply::status(status.as_u16(), message))
    }

    fn provider(&self) -> Provider {
        Provider::OpenRouter
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatError,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::GenerationParams;

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest {
            system_prompt: "be brief".to_string(),
            prompt: "hello".to_string(),
            params: GenerationParams {
                temperature: 0.5,
                top_p: 0.75,
            },
        };
        let json =
            serde_json::to_value(OpenRouterBackend::translate_request("m/free", &request)).unwrap();

        assert_eq!(json["model"], "m/free");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "be brief");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["top_p"], 0.75);
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"hi there"}}]}"#;
        assert_eq!(
            OpenRouterBackend::extract_text(body).as_deref(),
            Some("hi there")
        );
        assert_eq!(OpenRouterBackend::extract_text(r#"{"choices":[]}"#), None);
        assert_eq!(
            OpenRouterBackend::extract_text(r#"{"choices":[{"message":{"content":null}}]}"#),
            None
        );
    }
}
