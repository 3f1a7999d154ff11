use super::ModelGateway;
use crate::errors::GatewayError;
use crate::model::LlmResponse;
use ::tracing::{field, info_span, Instrument};
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps a gateway call in a `gateway.request` span.
pub struct TracingGateway {
    inner: Arc<dyn ModelGateway>,
}

impl TracingGateway {
    pub fn new(inner: Arc<dyn ModelGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ModelGateway for TracingGateway {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        structured_response: bool,
    ) -> Result<LlmResponse, GatewayError> {
        let span = info_span!(
            "gateway.request",
            "gateway.provider" = self.inner.provider_name(),
            "gateway.model" = model,
            "gateway.structured" = structured_response,
            "gateway.prompt_chars" = prompt.chars().count() as u64,
            "gateway.latency_ms" = field::Empty,
            "gateway.response_chars" = field::Empty,
            "error" = field::Empty,
            "error.message" = field::Empty
        );

        async move {
            let start = std::time::Instant::now();
            let result = self.inner.generate(model, prompt, structured_response).await;
            let span = ::tracing::Span::current();
            span.record("gateway.latency_ms", start.elapsed().as_millis() as u64);

            match &result {
                Ok(resp) => {
                    span.record("gateway.response_chars", resp.text.chars().count() as u64);
                    ::tracing::debug!("model call completed");
                }
                Err(e) => {
                    span.record("error", true);
                    span.record("error.message", e.to_string().as_str());
                    ::tracing::debug!(kind = e.kind.as_str(), "model call failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;

    #[tokio::test]
    async fn passes_results_through() {
        let inner = Arc::new(
            FakeGateway::new()
                .then_reply("ok")
                .then_fail(GatewayError::timeout("fake", "elapsed")),
        );
        let gw = TracingGateway::new(inner.clone());
        assert_eq!(gw.provider_name(), "fake");
        assert_eq!(gw.generate("m", "p", false).await.unwrap().text, "ok");
        let err = gw.generate("m", "p", true).await.unwrap_err();
        assert_eq!(err.message, "elapsed");
        assert_eq!(inner.call_count(), 2);
    }
}
