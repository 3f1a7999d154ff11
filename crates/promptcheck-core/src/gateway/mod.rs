//! Model gateway: one blocking-style request/response round trip to a remote
//! text-generation service, used for both the generator and evaluator roles.

pub mod fake;
pub mod openai;
pub mod retry;
pub mod tracing;

use crate::errors::GatewayError;
use crate::model::LlmResponse;
use async_trait::async_trait;

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send `prompt` as a single user message to `model`.
    ///
    /// `structured_response` asks the far end to constrain its reply to a JSON
    /// object. It is a hint only; callers still parse the returned text.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        structured_response: bool,
    ) -> Result<LlmResponse, GatewayError>;

    fn provider_name(&self) -> &'static str;
}
