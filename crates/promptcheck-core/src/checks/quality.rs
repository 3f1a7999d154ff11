use super::{Check, CheckContext, CheckKind, CheckResult};
use crate::errors::EvalError;
use crate::evaluation;
use crate::gateway::ModelGateway;
use crate::template::{evaluation_bindings, HydrationMode, Template};
use async_trait::async_trait;
use std::sync::Arc;

/// Grades the output with a second model and scores the structured reply.
pub struct QualityCheck {
    evaluator: Arc<dyn ModelGateway>,
    template: Arc<Template>,
    model: String,
    threshold: i64,
    hydration: HydrationMode,
}

impl QualityCheck {
    pub fn new(
        evaluator: Arc<dyn ModelGateway>,
        template: Arc<Template>,
        model: impl Into<String>,
        threshold: i64,
    ) -> Self {
        Self {
            evaluator,
            template,
            model: model.into(),
            threshold,
            hydration: HydrationMode::default(),
        }
    }

    pub fn with_hydration(mut self, mode: HydrationMode) -> Self {
        self.hydration = mode;
        self
    }
}

#[async_trait]
impl Check for QualityCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Quality
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult, EvalError> {
        let ideal = ctx.case.ideal_output.as_deref().unwrap_or("");
        let bindings = evaluation_bindings(ctx.input, ideal, ctx.output);
        let prompt = self.template.hydrate(&bindings, self.hydration)?;

        let resp = self.evaluator.generate(&self.model, &prompt, true).await?;
        tracing::debug!(case = %ctx.case.id, raw = %resp.text, "evaluator replied");

        let verdict = evaluation::score(&resp.text, self.threshold)?;
        let scores = verdict
            .dimensions
            .iter()
            .map(|d| format!("{}={}", d.name, d.score))
            .collect::<Vec<_>>()
            .join(", ");

        let mut result = if verdict.passed {
            CheckResult::pass(
                CheckKind::Quality,
                format!("Scores meet threshold {} ({})", self.threshold, scores),
            )
        } else {
            let failed = verdict
                .failed_dimensions()
                .map(|d| {
                    let why = if d.missing {
                        "score missing".to_string()
                    } else {
                        d.reasoning.clone().unwrap_or_else(|| "no reasoning given".into())
                    };
                    format!("{} {} < {}: {}", d.name, d.score, d.threshold, why)
                })
                .collect::<Vec<_>>()
                .join("; ");
            CheckResult::fail(CheckKind::Quality, format!("Below threshold: {}", failed))
        };
        result.verdict = Some(verdict);
        Ok(result)
    }
}
