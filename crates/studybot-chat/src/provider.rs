//! OpenAI-compatible `/chat/completions` client.
//!
//! Works against Groq (the default), OpenAI, or any server exposing the same
//! non-streaming chat-completions contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use studybot_core::config::ProviderConfig;

use crate::completion::{CompletionClient, CompletionError};
use crate::prompt::{PromptMessage, StructuredPrompt};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Completion client for OpenAI-compatible HTTP APIs.
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    timeout: Option<Duration>,
}

impl OpenAiCompatClient {
    /// Create a client for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key: None,
            temperature: None,
            timeout: None,
        }
    }

    /// Build a client from the `[provider]` config section.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::new(&config.base_url, config.model.clone())
            .with_api_key(config.api_key.clone())
            .with_temperature(config.temperature)
            .with_timeout(timeout)
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::Auth("no API key configured".to_string()))?;

        let body = CompletionRequest {
            model: &self.model,
            messages: &prompt.messages,
            stream: false,
            temperature: self.temperature,
        };

        let mut request = self.http.post(&self.endpoint).bearer_auth(api_key).json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = prompt.len(),
            "Sending completion request"
        );

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text).map_err(|e| {
            CompletionError::Unavailable(format!("malformed completion response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionError::Unavailable("completion response contained no text".to_string())
            })
    }
}

fn transport_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout(err.to_string())
    } else {
        CompletionError::Unavailable(err.to_string())
    }
}

/// Map a non-success HTTP status to a failure kind.
fn status_error(status: StatusCode, body: &str) -> CompletionError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    let message = if detail.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, detail)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Auth(message),
        StatusCode::BAD_REQUEST
        | StatusCode::NOT_FOUND
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNPROCESSABLE_ENTITY => CompletionError::InvalidRequest(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CompletionError::Timeout(message)
        }
        _ => CompletionError::Unavailable(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use crate::prompt::build_prompt;
    use studybot_core::types::Role;

    #[derive(Clone, Default)]
    struct Captured {
        auth: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<Value>>>,
    }

    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    async fn spawn_status(status: u16, body: Value) -> String {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let body = body.clone();
                async move {
                    (
                        axum::http::StatusCode::from_u16(status).unwrap(),
                        Json(body),
                    )
                }
            }),
        );
        spawn_provider(router).await
    }

    fn client(base_url: &str) -> OpenAiCompatClient {
        OpenAiCompatClient::new(base_url, "openai/gpt-oss-20b")
            .with_api_key(Some("gsk-test".to_string()))
    }

    fn sample_prompt() -> StructuredPrompt {
        build_prompt(
            "You are StudyBot.",
            &[
                (Role::User, "hi".to_string()),
                (Role::Assistant, "hello".to_string()),
            ],
            "continue",
        )
    }

    #[tokio::test]
    async fn test_complete_success_sends_expected_request() {
        let captured = Captured::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        *captured.auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        *captured.body.lock().unwrap() = Some(body);
                        Json(json!({
                            "choices": [{"index": 0, "message": {"role": "assistant", "content": "4."}}]
                        }))
                    },
                ),
            )
            .with_state(captured.clone());
        let base = spawn_provider(router).await;

        let answer = client(&base)
            .with_temperature(Some(0.5))
            .complete(&sample_prompt())
            .await
            .unwrap();
        assert_eq!(answer, "4.");

        assert_eq!(
            captured.auth.lock().unwrap().as_deref(),
            Some("Bearer gsk-test")
        );
        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "openai/gpt-oss-20b");
        assert_eq!(body["stream"], false);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(
            body["messages"],
            json!([
                {"role": "system", "content": "You are StudyBot."},
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "continue"},
            ])
        );
    }

    #[tokio::test]
    async fn test_temperature_omitted_when_unset() {
        let captured = Captured::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(|State(captured): State<Captured>, Json(body): Json<Value>| async move {
                    *captured.body.lock().unwrap() = Some(body);
                    Json(json!({"choices": [{"message": {"content": "ok"}}]}))
                }),
            )
            .with_state(captured.clone());
        let base = spawn_provider(router).await;

        client(&base).complete(&sample_prompt()).await.unwrap();
        let body = captured.body.lock().unwrap().clone().unwrap();
        assert!(body.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_auth_failure() {
        let client = OpenAiCompatClient::new("http://127.0.0.1:1/v1", "m");
        let err = client.complete(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Auth(_)));

        let blank = OpenAiCompatClient::new("http://127.0.0.1:1/v1", "m")
            .with_api_key(Some("  ".to_string()));
        let err = blank.complete(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Auth(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth() {
        let base = spawn_status(
            401,
            json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}),
        )
        .await;
        let err = client(&base).complete(&sample_prompt()).await.unwrap_err();
        match err {
            CompletionError::Auth(msg) => assert!(msg.contains("Invalid API Key")),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_request_maps_to_invalid_request() {
        let base = spawn_status(400, json!({"error": {"message": "model not found"}})).await;
        let err = client(&base).complete(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, CompletionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_server_errors_map_to_unavailable() {
        for status in [500u16, 502, 503, 429] {
            let base = spawn_status(status, json!({"error": {"message": "overloaded"}})).await;
            let err = client(&base).complete(&sample_prompt()).await.unwrap_err();
            assert!(
                matches!(err, CompletionError::Unavailable(_)),
                "status {} gave {:?}",
                status,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_unavailable() {
        let base = spawn_status(200, json!({"choices": []})).await;
        let err = client(&base).complete(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"choices": [{"message": {"content": "late"}}]}))
            }),
        );
        let base = spawn_provider(router).await;

        let err = client(&base)
            .with_timeout(Some(Duration::from_millis(100)))
            .complete(&sample_prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Timeout(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}/v1", addr))
            .complete(&sample_prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Unavailable(_)), "got {:?}", err);
    }

    #[test]
    fn test_from_config() {
        let config = ProviderConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            model: "m1".to_string(),
            api_key: Some("k".to_string()),
            timeout_secs: 0,
            temperature: None,
        };
        let client = OpenAiCompatClient::from_config(&config);
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
        assert_eq!(client.model(), "m1");
        assert!(client.timeout.is_none());
    }

    #[test]
    fn test_status_error_falls_back_to_raw_body() {
        let err = status_error(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert_eq!(
            err,
            CompletionError::Unavailable("HTTP 502 Bad Gateway: upstream exploded".to_string())
        );

        let err = status_error(StatusCode::FORBIDDEN, "");
        assert_eq!(err, CompletionError::Auth("HTTP 403 Forbidden".to_string()));
    }
}
