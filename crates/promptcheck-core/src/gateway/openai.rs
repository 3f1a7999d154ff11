use super::ModelGateway;
use crate::errors::{EvalError, GatewayError};
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

const PROVIDER: &str = "openai";

/// Read the API credential; unset or empty is a fatal configuration error.
pub fn api_key_from_env(var: &str) -> Result<String, EvalError> {
    match std::env::var(var) {
        Ok(k) if !k.trim().is_empty() => Ok(k),
        _ => Err(EvalError::MissingCredential {
            var: var.to_string(),
        }),
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI and compatible endpoints.
pub struct OpenAiGateway {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl OpenAiGateway {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout. Without one a call waits until the server answers.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn map_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::timeout(PROVIDER, e.to_string())
    } else {
        GatewayError::transport(PROVIDER, e.to_string())
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        structured_response: bool,
    ) -> Result<LlmResponse, GatewayError> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: structured_response.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut req = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }

        let resp = req.send().await.map_err(map_transport)?;
        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::from_status(
                PROVIDER,
                status.as_u16(),
                error_text,
            ));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            if e.is_decode() {
                GatewayError::malformed_response(PROVIDER, format!("invalid response body: {}", e))
            } else {
                map_transport(e)
            }
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                GatewayError::malformed_response(PROVIDER, "response missing choices[0].message.content")
            })?;

        Ok(LlmResponse {
            text,
            provider: PROVIDER.to_string(),
            model: model.to_string(),
            meta: json!({ "usage": parsed.usage }),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GatewayErrorKind;
    use mockito::Matcher;

    fn completion(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5}
        })
        .to_string()
    }

    #[tokio::test]
    async fn sends_single_user_message_and_reads_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::Json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Summarize this"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("- a summary"))
            .create_async()
            .await;

        let gw = OpenAiGateway::new("test-key".into()).with_base_url(server.url());
        let resp = gw
            .generate("gpt-3.5-turbo", "Summarize this", false)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp.text, "- a summary");
        assert_eq!(resp.model, "gpt-3.5-turbo");
        assert_eq!(resp.provider, "openai");
    }

    #[tokio::test]
    async fn structured_flag_requests_json_object() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o",
                "response_format": {"type": "json_object"}
            })))
            .with_status(200)
            .with_body(completion(r#"{"accuracy_score": 5}"#))
            .create_async()
            .await;

        let gw = OpenAiGateway::new("k".into()).with_base_url(format!("{}/", server.url()));
        let resp = gw.generate("gpt-4o", "grade", true).await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.text, r#"{"accuracy_score": 5}"#);
    }

    #[tokio::test]
    async fn error_status_becomes_gateway_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
            .create_async()
            .await;

        let gw = OpenAiGateway::new("k".into()).with_base_url(server.url());
        let err = gw.generate("gpt-4o", "hi", false).await.unwrap_err();

        assert_eq!(err.kind, GatewayErrorKind::RateLimited);
        assert_eq!(err.status, Some(429));
        assert!(err.message.contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn missing_content_is_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let gw = OpenAiGateway::new("k".into()).with_base_url(server.url());
        let err = gw.generate("gpt-4o", "hi", false).await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let gw = OpenAiGateway::new("k".into()).with_base_url("http://127.0.0.1:9");
        let err = gw.generate("gpt-4o", "hi", false).await.unwrap_err();
        assert!(matches!(
            err.kind,
            GatewayErrorKind::Transport | GatewayErrorKind::Timeout
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let gw = OpenAiGateway::new("k".into())
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Some(Duration::from_millis(200)));
        let err = gw.generate("gpt-4o", "hi", false).await.unwrap_err();

        assert_eq!(err.kind, GatewayErrorKind::Timeout);
        assert!(err.is_retryable());
        hold.abort();
    }

    #[test]
    fn empty_api_key_is_missing_credential() {
        let var = "PROMPTCHECK_TEST_EMPTY_KEY";
        std::env::set_var(var, "  ");
        let err = api_key_from_env(var).unwrap_err();
        std::env::remove_var(var);
        assert!(matches!(err, EvalError::MissingCredential { .. }));
        assert!(err.is_fatal());
    }
}
