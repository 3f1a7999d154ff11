//! Parsing and scoring of the evaluator model's structured reply.

use crate::errors::EvalError;
use serde::{Deserialize, Serialize};

/// Minimum passing score used when nothing else is configured.
pub const DEFAULT_THRESHOLD: i64 = 3;

/// Scored dimensions as (name, score key, reasoning key).
const DIMENSIONS: [(&str, &str, &str); 2] = [
    ("accuracy", "accuracy_score", "accuracy_reasoning"),
    ("conciseness", "conciseness_score", "conciseness_reasoning"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionVerdict {
    pub name: String,
    /// Extracted score; 0 when the key was absent or not a number.
    pub score: i64,
    /// True when the key was absent or not a number.
    pub missing: bool,
    pub threshold: i64,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreVerdict {
    pub passed: bool,
    pub threshold: i64,
    pub dimensions: Vec<DimensionVerdict>,
}

impl ScoreVerdict {
    pub fn failed_dimensions(&self) -> impl Iterator<Item = &DimensionVerdict> {
        self.dimensions.iter().filter(|d| !d.passed)
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionVerdict> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

/// Parse the evaluator reply as a JSON object.
pub fn parse_evaluation(raw_text: &str) -> Result<serde_json::Map<String, serde_json::Value>, EvalError> {
    let invalid = |detail: String| EvalError::InvalidEvaluationFormat {
        detail,
        raw: raw_text.to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(raw_text.trim()).map_err(|e| invalid(e.to_string()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(invalid(format!(
            "expected a JSON object, got {}",
            match other {
                serde_json::Value::Array(_) => "an array",
                serde_json::Value::String(_) => "a string",
                serde_json::Value::Number(_) => "a number",
                serde_json::Value::Bool(_) => "a boolean",
                _ => "null",
            }
        ))),
    }
}

fn extract_score(v: Option<&serde_json::Value>) -> Option<i64> {
    let v = v?;
    v.as_i64().or_else(|| v.as_f64().map(|f| f.trunc() as i64))
}

/// Score an evaluator reply: every dimension must reach `threshold` (inclusive).
pub fn score(raw_text: &str, threshold: i64) -> Result<ScoreVerdict, EvalError> {
    let obj = parse_evaluation(raw_text)?;

    let dimensions: Vec<DimensionVerdict> = DIMENSIONS
        .iter()
        .map(|(name, score_key, reason_key)| {
            let extracted = extract_score(obj.get(*score_key));
            let score = extracted.unwrap_or(0);
            DimensionVerdict {
                name: (*name).to_string(),
                score,
                missing: extracted.is_none(),
                threshold,
                passed: extracted.is_some() && score >= threshold,
                reasoning: obj
                    .get(*reason_key)
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
            }
        })
        .collect();

    Ok(ScoreVerdict {
        passed: dimensions.iter().all(|d| d.passed),
        threshold,
        dimensions,
    })
}
