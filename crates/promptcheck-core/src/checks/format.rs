use super::{Check, CheckContext, CheckKind, CheckResult};
use crate::errors::EvalError;
use async_trait::async_trait;

/// Characters accepted as a leading bullet marker.
pub const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRule {
    StartsWithBullet,
}

impl FormatRule {
    pub fn parse(name: &str) -> Result<Self, EvalError> {
        match name {
            "starts_with_bullet" => Ok(FormatRule::StartsWithBullet),
            other => Err(EvalError::UnknownFormatRule(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatRule::StartsWithBullet => "starts_with_bullet",
        }
    }

    /// Leading whitespace is ignored before the rule is applied.
    pub fn matches(self, output: &str) -> bool {
        let trimmed = output.trim_start();
        match self {
            FormatRule::StartsWithBullet => trimmed
                .chars()
                .next()
                .is_some_and(|c| BULLET_MARKERS.contains(&c)),
        }
    }
}

pub struct FormatCheck;

#[async_trait]
impl Check for FormatCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Format
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult, EvalError> {
        let name = ctx
            .case
            .expected_format
            .as_deref()
            .ok_or_else(|| EvalError::MissingField {
                id: ctx.case.id.clone(),
                check: CheckKind::Format,
                field: "expected_format",
            })?;
        let rule = FormatRule::parse(name)?;

        if rule.matches(ctx.output) {
            Ok(CheckResult::pass(
                CheckKind::Format,
                format!("Output satisfies format rule '{}'", rule.as_str()),
            ))
        } else {
            Ok(CheckResult::fail(
                CheckKind::Format,
                format!("Output does not satisfy format rule '{}'", rule.as_str()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestCase;

    #[test]
    fn starts_with_bullet() {
        let rule = FormatRule::StartsWithBullet;
        assert!(rule.matches("- point one"));
        assert!(rule.matches("  - point one"));
        assert!(rule.matches("\n* point one"));
        assert!(rule.matches("• point one"));
        assert!(!rule.matches("Point one"));
        assert!(!rule.matches("1. point one"));
        assert!(!rule.matches("   "));
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let err = FormatRule::parse("numbered_list").unwrap_err();
        assert!(matches!(err, EvalError::UnknownFormatRule(ref n) if n == "numbered_list"));
    }

    #[tokio::test]
    async fn unknown_rule_fails_the_check_instead_of_passing() {
        let case = TestCase::new("t1", "article").with_format("title_case");
        let ctx = CheckContext {
            case: &case,
            input: "article",
            output: "- anything",
        };
        let err = FormatCheck.evaluate(&ctx).await.unwrap_err();
        assert!(matches!(err, EvalError::UnknownFormatRule(_)));
    }

    #[tokio::test]
    async fn evaluates_named_rule() {
        let case = TestCase::new("t1", "article").with_format("starts_with_bullet");
        let ctx = CheckContext {
            case: &case,
            input: "article",
            output: "Point one",
        };
        let res = FormatCheck.evaluate(&ctx).await.unwrap();
        assert!(!res.passed);
        assert_eq!(res.kind, CheckKind::Format);
    }
}
