pub mod format;
pub mod keyword;
pub mod quality;

use crate::errors::EvalError;
use crate::evaluation::ScoreVerdict;
use crate::model::TestCase;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use format::{FormatCheck, FormatRule};
pub use keyword::KeywordCheck;
pub use quality::QualityCheck;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Keyword,
    Format,
    Quality,
}

impl CheckKind {
    /// Execution order: local checks before the evaluator round trip.
    pub const ALL: [CheckKind; 3] = [CheckKind::Keyword, CheckKind::Format, CheckKind::Quality];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::Keyword => "keyword",
            CheckKind::Format => "format",
            CheckKind::Quality => "quality",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ScoreVerdict>,
}

impl CheckResult {
    pub fn pass(kind: CheckKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            passed: true,
            message: msg.into(),
            verdict: None,
        }
    }

    pub fn fail(kind: CheckKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            passed: false,
            message: msg.into(),
            verdict: None,
        }
    }
}

/// What a check gets to look at for one case.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub case: &'a TestCase,
    pub input: &'a str,
    pub output: &'a str,
}

#[async_trait]
pub trait Check: Send + Sync {
    fn kind(&self) -> CheckKind;

    /// `Ok` with a failed result is an ordinary check failure; `Err` means the
    /// check could not be carried out.
    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult, EvalError>;
}
