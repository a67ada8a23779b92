//! LLM Gateway
//!
//! Opaque text completion: `(system prompt, message history, max output tokens)
//! -> assistant text`. One attempt per call; a timeout or upstream error is
//! returned to the caller as a [`GatewayError`] and never retried here.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Errors from the completion call
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM returned status {status}")]
    Status { status: u16, body: String },

    #[error("LLM returned no text content")]
    EmptyResponse,

    #[error("LLM client configuration error: {0}")]
    Config(String),
}

/// Text completion gateway
#[trait_variant::make(LlmGateway: Send)]
pub trait LocalLlmGateway {
    /// Complete the conversation and return the assistant text
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, GatewayError>;
}

/// Anthropic Messages API settings
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_version: "2023-06-01".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn into_text(self) -> Result<String, GatewayError> {
        self.content
            .into_iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)
    }
}

/// Gateway backed by the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicGateway {
    http: reqwest::Client,
    config: Arc<AnthropicConfig>,
}

impl AnthropicGateway {
    pub fn new(config: AnthropicConfig) -> Result<Self, GatewayError> {
        if config.api_key.is_empty() {
            return Err(GatewayError::Config("API key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

impl LlmGateway for AnthropicGateway {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens,
            system: system_prompt,
            messages,
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "LLM gateway returned an error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed.into_text()?;

        tracing::debug!(
            turns = messages.len(),
            max_tokens,
            response_chars = text.len(),
            "LLM completion finished"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::post};

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_into_text_picks_first_text_block() {
        let raw = r#"{"content":[{"type":"tool_use","id":"x"},{"type":"text","text":"hello"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "hello");
    }

    #[test]
    fn test_into_text_rejects_empty() {
        let parsed: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(matches!(parsed.into_text(), Err(GatewayError::EmptyResponse)));
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = AnthropicGateway::new(AnthropicConfig::default());
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_complete_against_stub_server() {
        let router = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers.get("x-api-key").unwrap(), "test-key");
                assert_eq!(body["max_tokens"], 64);
                assert_eq!(body["system"], "be brief");
                let last = body["messages"].as_array().unwrap().len();
                Json(serde_json::json!({
                    "content": [{ "type": "text", "text": format!("seen {} turns", last) }]
                }))
            }),
        );
        let base_url = serve(router).await;

        let gateway = AnthropicGateway::new(AnthropicConfig {
            api_key: "test-key".to_string(),
            base_url,
            ..AnthropicConfig::default()
        })
        .unwrap();

        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
        ];
        let text = LlmGateway::complete(&gateway, "be brief", &messages, 64)
            .await
            .unwrap();
        assert_eq!(text, "seen 3 turns");
    }

    #[tokio::test]
    async fn test_complete_surfaces_error_status() {
        let router = Router::new().route(
            "/v1/messages",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        );
        let base_url = serve(router).await;

        let gateway = AnthropicGateway::new(AnthropicConfig {
            api_key: "k".to_string(),
            base_url,
            ..AnthropicConfig::default()
        })
        .unwrap();

        let err = LlmGateway::complete(&gateway, "s", &[ChatMessage::user("x")], 16)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 503, .. }));
    }
}
