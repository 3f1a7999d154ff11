pub mod runner;

use crate::config::HarnessConfig;
use crate::dataset::load_test_cases;
use crate::errors::EvalError;
use crate::checks::CheckKind;
use crate::model::TestCase;
use crate::template::Template;

pub use runner::{RunSettings, Runner};

/// Everything read from disk before the first case runs.
#[derive(Debug, Clone)]
pub struct SuiteInputs {
    pub cases: Vec<TestCase>,
    pub prompt_template: Template,
    /// Loaded only when some case requests the quality check.
    pub evaluation_template: Option<Template>,
}

impl SuiteInputs {
    /// Loads test data and templates. Any failure here is fatal for the run.
    pub fn load(cfg: &HarnessConfig) -> Result<Self, EvalError> {
        let cases = load_test_cases(&cfg.test_data)?;
        let prompt_template = Template::load(&cfg.prompt_template)?;
        let needs_quality = cases
            .iter()
            .any(|c| c.requested_checks().contains(&CheckKind::Quality));
        let evaluation_template = if needs_quality {
            Some(Template::load(&cfg.evaluation_template)?)
        } else {
            tracing::debug!("no case requests the quality check; evaluation template not loaded");
            None
        };
        Ok(Self {
            cases,
            prompt_template,
            evaluation_template,
        })
    }
}

impl From<&HarnessConfig> for RunSettings {
    fn from(cfg: &HarnessConfig) -> Self {
        RunSettings {
            generator_model: cfg.generator_model.clone(),
            evaluator_model: cfg.evaluator_model.clone(),
            threshold: cfg.threshold,
            hydration: cfg.hydration,
        }
    }
}
