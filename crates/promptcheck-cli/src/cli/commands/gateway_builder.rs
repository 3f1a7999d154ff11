use promptcheck_core::config::{HarnessConfig, ProviderKind};
use promptcheck_core::errors::EvalError;
use promptcheck_core::gateway::fake::FakeGateway;
use promptcheck_core::gateway::openai::{api_key_from_env, OpenAiGateway};
use promptcheck_core::gateway::retry::RetryingGateway;
use promptcheck_core::gateway::tracing::TracingGateway;
use promptcheck_core::gateway::ModelGateway;
use std::sync::Arc;

const FAKE_OUTPUT: &str = "- fake summary";
const FAKE_EVALUATION: &str = r#"{"accuracy_score": 5, "conciseness_score": 5, "accuracy_reasoning": "fake", "conciseness_reasoning": "fake"}"#;

/// Generator and evaluator gateways for one run.
pub(crate) struct Gateways {
    pub generator: Arc<dyn ModelGateway>,
    pub evaluator: Arc<dyn ModelGateway>,
}

/// Canned replies for the fake provider.
#[derive(Debug, Default, Clone)]
pub(crate) struct FakeReplies {
    pub output: Option<String>,
    pub evaluation: Option<String>,
}

fn instrument(inner: Arc<dyn ModelGateway>, cfg: &HarnessConfig) -> Arc<dyn ModelGateway> {
    let retrying: Arc<dyn ModelGateway> =
        Arc::new(RetryingGateway::new(inner, cfg.gateway.retry_policy()));
    Arc::new(TracingGateway::new(retrying))
}

/// Builds the gateways. For `openai` the credential is checked here, so a
/// missing key aborts the run before any file is read.
pub(crate) fn build_gateways(cfg: &HarnessConfig, fake: &FakeReplies) -> Result<Gateways, EvalError> {
    match cfg.gateway.provider {
        ProviderKind::OpenAi => {
            let key = api_key_from_env(&cfg.gateway.api_key_env)?;
            let mut client = OpenAiGateway::new(key).with_timeout(cfg.gateway.timeout());
            if let Some(url) = &cfg.gateway.base_url {
                client = client.with_base_url(url.clone());
            }
            let shared = instrument(Arc::new(client), cfg);
            Ok(Gateways {
                generator: shared.clone(),
                evaluator: shared,
            })
        }
        ProviderKind::Fake => {
            let generator = FakeGateway::new()
                .with_response(fake.output.clone().unwrap_or_else(|| FAKE_OUTPUT.to_string()));
            let evaluator = FakeGateway::new().with_response(
                fake.evaluation
                    .clone()
                    .unwrap_or_else(|| FAKE_EVALUATION.to_string()),
            );
            Ok(Gateways {
                generator: instrument(Arc::new(generator), cfg),
                evaluator: instrument(Arc::new(evaluator), cfg),
            })
        }
    }
}
