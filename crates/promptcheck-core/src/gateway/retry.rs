use super::ModelGateway;
use crate::errors::GatewayError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first call. Zero disables retries.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub(crate) fn delay_for(&self, retry_no: u32) -> Duration {
        let factor = 1u32.checked_shl(retry_no.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor)
    }
}

/// Retries retryable gateway errors with exponential backoff.
pub struct RetryingGateway {
    inner: Arc<dyn ModelGateway>,
    policy: RetryPolicy,
}

impl RetryingGateway {
    pub fn new(inner: Arc<dyn ModelGateway>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl ModelGateway for RetryingGateway {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        structured_response: bool,
    ) -> Result<LlmResponse, GatewayError> {
        let mut retry_no = 0;
        loop {
            match self.inner.generate(model, prompt, structured_response).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && retry_no < self.policy.max_retries => {
                    retry_no += 1;
                    let delay = self.policy.delay_for(retry_no);
                    tracing::warn!(
                        model,
                        retry = retry_no,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying model call"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
