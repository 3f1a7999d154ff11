use super::{Check, CheckContext, CheckKind, CheckResult};
use crate::errors::EvalError;
use async_trait::async_trait;

/// Case-insensitive substring match.
pub fn contains_keyword(output: &str, keyword: &str) -> bool {
    output.to_lowercase().contains(&keyword.to_lowercase())
}

pub struct KeywordCheck;

#[async_trait]
impl Check for KeywordCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Keyword
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult, EvalError> {
        let keyword = ctx
            .case
            .expected_keyword
            .as_deref()
            .ok_or_else(|| EvalError::MissingField {
                id: ctx.case.id.clone(),
                check: CheckKind::Keyword,
                field: "expected_keyword",
            })?;

        if contains_keyword(ctx.output, keyword) {
            Ok(CheckResult::pass(
                CheckKind::Keyword,
                format!("Expected keyword '{}' found in output", keyword),
            ))
        } else {
            Ok(CheckResult::fail(
                CheckKind::Keyword,
                format!("Expected keyword '{}' NOT found in output", keyword),
            ))
        }
    }
}
