//! OpenAI-compatible chat-completion client.
//!
//! Endpoint: `POST {base_url}/chat/completions`. One request per prompt, no streaming and no
//! retry; the reply text is `choices[0].message.content`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use scribe_core::{GenerationError, GenerationService};

use crate::config::{ChatConfig, SYSTEM_PROMPT};

/// Chat-completion client implementing [`GenerationService`].
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: Client,
    config: ChatConfig,
}

impl ChatCompletionClient {
    /// Create a client. No request timeout is applied unless the config sets one.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: ChatConfig) -> Result<Self, GenerationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: self.config.model(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature(),
        }
    }
}

#[async_trait]
impl GenerationService for ChatCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.config.completions_url();
        tracing::debug!("POST {} (model {})", url, self.config.model());

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key())
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Transport(format!("request timed out: {e}"))
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("chat completion failed with HTTP {}", status);
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("unreadable response: {e}")))?;

        extract_content(parsed)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_content(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn client_for(base_url: &str) -> ChatCompletionClient {
        let config = ChatConfig::new(base_url, "test-model", "sk-test").expect("valid config");
        ChatCompletionClient::new(config).expect("client")
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}/v1")
    }

    #[test]
    fn request_body_has_system_and_user_messages() {
        let client = client_for("http://localhost");
        let body = serde_json::to_value(client.request_body("hello")).expect("serialise");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "hello"}));
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn first_choice_content_is_returned() {
        let parsed: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "### Note\nok"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .expect("parse");
        assert_eq!(extract_content(parsed).unwrap(), "### Note\nok");
    }

    #[test]
    fn missing_or_blank_content_is_empty_response() {
        let parsed: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(extract_content(parsed), Err(GenerationError::EmptyResponse));

        let parsed: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": "  "}}]})).unwrap();
        assert_eq!(extract_content(parsed), Err(GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn generates_against_compatible_server() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("echo: {prompt}")}}]
                }))
            }),
        );
        let base_url = serve(app).await;

        let client = client_for(&base_url);
        assert_eq!(client.config().model(), "test-model");
        let reply = client.generate("draft this").await.expect("reply");
        assert_eq!(reply, "echo: draft this");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base_url = serve(app).await;

        let err = client_for(&base_url)
            .generate("draft this")
            .await
            .expect_err("401");
        assert_eq!(
            err,
            GenerationError::Status {
                status: 401,
                body: "bad key".into()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let err = client_for("http://127.0.0.1:9/v1")
            .generate("draft this")
            .await
            .expect_err("nothing listening");
        assert!(matches!(err, GenerationError::Transport(_)));
    }
}
