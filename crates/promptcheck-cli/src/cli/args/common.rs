//! Shared argument types used by `run` and `validate`.

use std::path::PathBuf;

use clap::ValueEnum;
use promptcheck_core::config::{load_config, HarnessConfig, ProviderKind};
use promptcheck_core::errors::EvalError;
use promptcheck_core::template::HydrationMode;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderArg {
    /// OpenAI-compatible chat completions endpoint
    Openai,
    /// Canned in-memory replies (offline dry runs, tests)
    Fake,
}

impl From<ProviderArg> for ProviderKind {
    fn from(p: ProviderArg) -> Self {
        match p {
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Fake => ProviderKind::Fake,
        }
    }
}

/// Where the suite lives and how it is scored. Flags override the config file.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct SuiteArgs {
    /// Optional YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Generation prompt template (default: prompts/summarize_article.txt)
    #[arg(long)]
    pub prompt_template: Option<PathBuf>,

    /// Grading prompt template (default: tests/evaluation_prompt.txt)
    #[arg(long)]
    pub evaluation_template: Option<PathBuf>,

    /// Test case file, a JSON array (default: tests/test_data.json)
    #[arg(long)]
    pub test_data: Option<PathBuf>,

    #[arg(long, env = "PROMPTCHECK_GENERATOR_MODEL")]
    pub generator_model: Option<String>,

    #[arg(long, env = "PROMPTCHECK_EVALUATOR_MODEL")]
    pub evaluator_model: Option<String>,

    /// Minimum passing score per dimension, inclusive (default: 3)
    #[arg(long, env = "PROMPTCHECK_THRESHOLD")]
    pub threshold: Option<i64>,

    /// Fail a case when a template placeholder has no value
    #[arg(long)]
    pub strict_templates: bool,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GatewayArgs {
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Base URL of the chat completions API
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Environment variable holding the API key (default: OPENAI_API_KEY)
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Per-request timeout; unset waits indefinitely
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries for transport, timeout, 429 and 5xx errors (default: 0)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Delay before the first retry, doubled on each further retry
    #[arg(long)]
    pub retry_backoff_ms: Option<u64>,
}

impl SuiteArgs {
    /// Loads the config file (if any), applies flag overrides and validates the result.
    pub fn resolve(&self, gateway: Option<&GatewayArgs>) -> Result<HarnessConfig, EvalError> {
        let mut cfg = match &self.config {
            Some(path) => load_config(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(p) = &self.prompt_template {
            cfg.prompt_template = p.clone();
        }
        if let Some(p) = &self.evaluation_template {
            cfg.evaluation_template = p.clone();
        }
        if let Some(p) = &self.test_data {
            cfg.test_data = p.clone();
        }
        if let Some(m) = &self.generator_model {
            cfg.generator_model = m.clone();
        }
        if let Some(m) = &self.evaluator_model {
            cfg.evaluator_model = m.clone();
        }
        if let Some(t) = self.threshold {
            cfg.threshold = t;
        }
        if self.strict_templates {
            cfg.hydration = HydrationMode::Strict;
        }

        if let Some(g) = gateway {
            if let Some(p) = g.provider {
                cfg.gateway.provider = p.into();
            }
            if let Some(u) = &g.base_url {
                cfg.gateway.base_url = Some(u.clone());
            }
            if let Some(v) = &g.api_key_env {
                cfg.gateway.api_key_env = v.clone();
            }
            if let Some(t) = g.timeout_secs {
                cfg.gateway.timeout_secs = Some(t);
            }
            if let Some(n) = g.max_retries {
                cfg.gateway.max_retries = n;
            }
            if let Some(ms) = g.retry_backoff_ms {
                cfg.gateway.retry_backoff_ms = ms;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }
}
