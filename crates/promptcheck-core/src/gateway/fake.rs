use super::ModelGateway;
use crate::errors::GatewayError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request seen by [`FakeGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub model: String,
    pub prompt: String,
    pub structured_response: bool,
}

/// In-memory gateway returning canned replies.
///
/// Scripted replies are consumed first, in order; once they run out the fixed
/// response (if any) is returned, otherwise the prompt is echoed back.
#[derive(Debug, Default)]
pub struct FakeGateway {
    fixed_response: Option<String>,
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn then_fail(self, err: GatewayError) -> Self {
        self.push(Err(err));
        self
    }

    fn push(&self, item: Result<String, GatewayError>) {
        self.script
            .lock()
            .expect("fake gateway script lock")
            .push_back(item);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("fake gateway request lock")
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .expect("fake gateway request lock")
            .len()
    }
}

#[async_trait]
impl ModelGateway for FakeGateway {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        structured_response: bool,
    ) -> Result<LlmResponse, GatewayError> {
        self.requests
            .lock()
            .expect("fake gateway request lock")
            .push(RecordedRequest {
                model: model.to_string(),
                prompt: prompt.to_string(),
                structured_response,
            });

        let scripted = self
            .script
            .lock()
            .expect("fake gateway script lock")
            .pop_front();
        let text = match scripted {
            Some(item) => item?,
            None => self
                .fixed_response
                .clone()
                .unwrap_or_else(|| prompt.to_string()),
        };

        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: model.to_string(),
            meta: serde_json::json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_then_fixed_then_records() {
        let gw = FakeGateway::new()
            .with_response("fixed")
            .then_reply("first")
            .then_fail(GatewayError::transport("fake", "boom"));

        assert_eq!(gw.generate("m", "p1", false).await.unwrap().text, "first");
        assert!(gw.generate("m", "p2", true).await.is_err());
        assert_eq!(gw.generate("m", "p3", false).await.unwrap().text, "fixed");

        let reqs = gw.requests();
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[1].prompt, "p2");
        assert!(reqs[1].structured_response);
    }

    #[tokio::test]
    async fn echoes_prompt_without_fixed_response() {
        let gw = FakeGateway::new();
        let resp = gw.generate("m", "hello", false).await.unwrap();
        assert_eq!(resp.text, "hello");
        assert_eq!(resp.provider, "fake");
    }
}
