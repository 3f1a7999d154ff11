use crate::checks::{CheckKind, CheckResult};
use serde::{Deserialize, Serialize};

/// One test case record from the test data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_format: Option<String>,
    /// Explicit check selection; when absent the checks are inferred from the fields present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<CheckKind>>,
}

impl TestCase {
    pub fn new(id: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input: Some(input.into()),
            ideal_output: None,
            expected_keyword: None,
            expected_format: None,
            checks: None,
        }
    }

    pub fn with_ideal_output(mut self, ideal: impl Into<String>) -> Self {
        self.ideal_output = Some(ideal.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.expected_keyword = Some(keyword.into());
        self
    }

    pub fn with_format(mut self, rule: impl Into<String>) -> Self {
        self.expected_format = Some(rule.into());
        self
    }

    pub fn with_checks(mut self, checks: Vec<CheckKind>) -> Self {
        self.checks = Some(checks);
        self
    }

    /// Checks to run, deduplicated, in execution order (keyword, format, quality).
    pub fn requested_checks(&self) -> Vec<CheckKind> {
        let wanted: Vec<CheckKind> = match &self.checks {
            Some(explicit) => explicit.clone(),
            None => {
                let mut inferred = Vec::new();
                if self.expected_keyword.is_some() {
                    inferred.push(CheckKind::Keyword);
                }
                if self.expected_format.is_some() {
                    inferred.push(CheckKind::Format);
                }
                if self.ideal_output.is_some() {
                    inferred.push(CheckKind::Quality);
                }
                inferred
            }
        };
        CheckKind::ALL
            .into_iter()
            .filter(|k| wanted.contains(k))
            .collect()
    }
}

/// Raw reply from a model gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub meta: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    #[default]
    Pending,
    Hydrating,
    Generating,
    Evaluating,
    Passed,
    Failed,
}

impl CaseState {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseState::Pending => "pending",
            CaseState::Hydrating => "hydrating",
            CaseState::Generating => "generating",
            CaseState::Evaluating => "evaluating",
            CaseState::Passed => "passed",
            CaseState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one case after the runner is done with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub id: String,
    pub state: CaseState,
    /// State the case was in when an error ended it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<CaseState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub checks: Vec<CheckResult>,
    pub duration_ms: u64,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.state == CaseState::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_inferred_from_fields() {
        let tc = TestCase::new("t1", "text")
            .with_ideal_output("summary")
            .with_keyword("agreement");
        assert_eq!(
            tc.requested_checks(),
            vec![CheckKind::Keyword, CheckKind::Quality]
        );

        let bare = TestCase::new("t2", "text");
        assert!(bare.requested_checks().is_empty());
    }

    #[test]
    fn explicit_checks_override_inference_and_are_ordered() {
        let tc = TestCase::new("t1", "text")
            .with_ideal_output("summary")
            .with_checks(vec![CheckKind::Quality, CheckKind::Keyword, CheckKind::Quality]);
        assert_eq!(
            tc.requested_checks(),
            vec![CheckKind::Keyword, CheckKind::Quality]
        );
    }

    #[test]
    fn deserializes_with_unknown_fields() {
        let tc: TestCase = serde_json::from_str(
            r#"{"id": "a", "input": "x", "notes": "ignored", "checks": ["format"]}"#,
        )
        .unwrap();
        assert_eq!(tc.id, "a");
        assert_eq!(tc.checks, Some(vec![CheckKind::Format]));
    }
}
