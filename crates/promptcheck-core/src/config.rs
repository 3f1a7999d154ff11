use crate::errors::EvalError;
use crate::evaluation::DEFAULT_THRESHOLD;
use crate::gateway::openai::DEFAULT_API_KEY_ENV;
use crate::gateway::retry::RetryPolicy;
use crate::template::HydrationMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_PROMPT_TEMPLATE: &str = "prompts/summarize_article.txt";
pub const DEFAULT_EVALUATION_TEMPLATE: &str = "tests/evaluation_prompt.txt";
pub const DEFAULT_TEST_DATA: &str = "tests/test_data.json";
pub const DEFAULT_GENERATOR_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EVALUATOR_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Fake,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Fake => "fake",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewaySettings {
    pub provider: ProviderKind,
    pub base_url: Option<String>,
    pub api_key_env: String,
    /// Unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: None,
            max_retries: retry.max_retries,
            retry_backoff_ms: retry.backoff.as_millis() as u64,
        }
    }
}

impl GatewaySettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Harness settings, read from an optional YAML file and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub version: u32,
    pub prompt_template: PathBuf,
    pub evaluation_template: PathBuf,
    pub test_data: PathBuf,
    pub generator_model: String,
    pub evaluator_model: String,
    pub threshold: i64,
    pub hydration: HydrationMode,
    pub gateway: GatewaySettings,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            prompt_template: PathBuf::from(DEFAULT_PROMPT_TEMPLATE),
            evaluation_template: PathBuf::from(DEFAULT_EVALUATION_TEMPLATE),
            test_data: PathBuf::from(DEFAULT_TEST_DATA),
            generator_model: DEFAULT_GENERATOR_MODEL.to_string(),
            evaluator_model: DEFAULT_EVALUATOR_MODEL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            hydration: HydrationMode::default(),
            gateway: GatewaySettings::default(),
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(EvalError::Config(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        if self.threshold < 1 {
            return Err(EvalError::Config(format!(
                "threshold must be at least 1, got {}",
                self.threshold
            )));
        }
        if self.generator_model.trim().is_empty() || self.evaluator_model.trim().is_empty() {
            return Err(EvalError::Config("model ids must not be empty".into()));
        }
        if self.gateway.api_key_env.trim().is_empty() {
            return Err(EvalError::Config("gateway.api_key_env must not be empty".into()));
        }
        if self.gateway.timeout_secs == Some(0) {
            return Err(EvalError::Config(
                "gateway.timeout_secs must be positive (omit it to wait indefinitely)".into(),
            ));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<HarnessConfig, EvalError> {
    let raw = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let cfg: HarnessConfig = serde_yaml::from_str(&raw).map_err(|e| {
        EvalError::Config(format!("failed to parse {}: {}", path.display(), e))
    })?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.threshold, 3);
        assert_eq!(cfg.generator_model, "gpt-3.5-turbo");
        assert_eq!(cfg.evaluator_model, "gpt-4o");
        assert_eq!(cfg.gateway.max_retries, 0);
        assert_eq!(cfg.gateway.timeout(), None);
        assert_eq!(cfg.gateway.api_key_env, "OPENAI_API_KEY");
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let f = write_yaml(
            "version: 1\nthreshold: 4\nhydration: strict\ngateway:\n  provider: fake\n  timeout_secs: 30\n",
        );
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.threshold, 4);
        assert_eq!(cfg.hydration, HydrationMode::Strict);
        assert_eq!(cfg.gateway.provider, ProviderKind::Fake);
        assert_eq!(cfg.gateway.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.test_data, PathBuf::from(DEFAULT_TEST_DATA));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let f = write_yaml("version: 1\nthreshhold: 4\n");
        let err = load_config(f.path()).unwrap_err();
        assert!(matches!(err, EvalError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn zero_threshold_is_invalid() {
        let f = write_yaml("version: 1\nthreshold: 0\n");
        let err = load_config(f.path()).unwrap_err();
        assert!(err.to_string().contains("threshold must be at least 1"));
    }

    #[test]
    fn wrong_version_is_invalid() {
        let f = write_yaml("version: 2\n");
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let err = load_config(Path::new("/nonexistent/promptcheck.yaml")).unwrap_err();
        assert!(matches!(err, EvalError::MissingFile { .. }));
    }
}
