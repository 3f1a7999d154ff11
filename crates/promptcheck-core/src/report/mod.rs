pub mod console;
pub mod json;
pub mod progress;

use crate::model::CaseResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a whole run, cases in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_started_at: DateTime<Utc>,
    pub run_finished_at: DateTime<Utc>,
    pub generator_model: String,
    pub evaluator_model: String,
    pub threshold: i64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub any_failed: bool,
    pub results: Vec<CaseResult>,
}

/// Static facts about a run that are recorded alongside the results.
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub run_started_at: DateTime<Utc>,
    pub generator_model: String,
    pub evaluator_model: String,
    pub threshold: i64,
}

impl RunReport {
    pub fn from_results(meta: RunMeta, results: Vec<CaseResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        let failed = results.len() - passed;
        Self {
            run_started_at: meta.run_started_at,
            run_finished_at: Utc::now(),
            generator_model: meta.generator_model,
            evaluator_model: meta.evaluator_model,
            threshold: meta.threshold,
            total: results.len(),
            passed,
            failed,
            any_failed: failed > 0,
            results,
        }
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.passed())
    }
}
