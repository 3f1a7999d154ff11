use crate::checks::{Check, CheckContext, CheckKind, CheckResult, FormatCheck, KeywordCheck, QualityCheck};
use crate::errors::EvalError;
use crate::gateway::ModelGateway;
use crate::model::{CaseResult, CaseState, TestCase};
use crate::report::progress::{CaseEvent, EventSink};
use crate::report::{RunMeta, RunReport};
use crate::template::{generation_bindings, HydrationMode, Template};
use crate::validate::case_problems;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub generator_model: String,
    pub evaluator_model: String,
    pub threshold: i64,
    pub hydration: HydrationMode,
}

/// Drives every case through hydrate, generate and evaluate, one at a time.
pub struct Runner {
    generator: Arc<dyn ModelGateway>,
    evaluator: Arc<dyn ModelGateway>,
    prompt_template: Arc<Template>,
    quality: Option<QualityCheck>,
    settings: RunSettings,
    events: Option<EventSink>,
}

/// Mutable per-case bookkeeping, kept outside the fallible path so a failure
/// still reports how far the case got.
#[derive(Default)]
struct CaseProgress {
    state: CaseState,
    current_check: Option<CheckKind>,
    output: Option<String>,
    checks: Vec<CheckResult>,
}

impl Runner {
    pub fn new(
        generator: Arc<dyn ModelGateway>,
        evaluator: Arc<dyn ModelGateway>,
        prompt_template: Template,
        settings: RunSettings,
    ) -> Self {
        Self {
            generator,
            evaluator,
            prompt_template: Arc::new(prompt_template),
            quality: None,
            settings,
            events: None,
        }
    }

    /// Enables the quality check. Without it, cases requesting quality fail.
    pub fn with_evaluation_template(mut self, template: Template) -> Self {
        self.quality = Some(
            QualityCheck::new(
                self.evaluator.clone(),
                Arc::new(template),
                self.settings.evaluator_model.clone(),
                self.settings.threshold,
            )
            .with_hydration(self.settings.hydration),
        );
        self
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    fn emit(&self, ev: CaseEvent<'_>) {
        if let Some(sink) = &self.events {
            sink(&ev);
        }
    }

    /// Runs all cases in input order. A failing case never stops the run.
    pub async fn run_suite(&self, cases: &[TestCase]) -> RunReport {
        let meta = RunMeta {
            run_started_at: chrono::Utc::now(),
            generator_model: self.settings.generator_model.clone(),
            evaluator_model: self.settings.evaluator_model.clone(),
            threshold: self.settings.threshold,
        };
        let total = cases.len();
        tracing::info!(total, "starting run");

        let mut results = Vec::with_capacity(total);
        for (index, tc) in cases.iter().enumerate() {
            self.emit(CaseEvent::Started {
                index,
                total,
                id: &tc.id,
            });
            let result = self.run_case(tc).await;
            self.emit(CaseEvent::Finished { result: &result });
            results.push(result);
        }

        let report = RunReport::from_results(meta, results);
        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            "run finished"
        );
        report
    }

    pub async fn run_case(&self, tc: &TestCase) -> CaseResult {
        let start = Instant::now();
        let mut progress = CaseProgress::default();
        let outcome = self.drive_case(tc, &mut progress).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let mut reasons: Vec<String> = progress
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| format!("{}: {}", c.kind, c.message))
            .collect();

        let (state, failed_at, error_kind) = match outcome {
            Ok(()) if reasons.is_empty() => (CaseState::Passed, None, None),
            Ok(()) => (CaseState::Failed, Some(CaseState::Evaluating), None),
            Err(e) => {
                if let EvalError::InvalidEvaluationFormat { raw, .. } = &e {
                    tracing::warn!(case = %tc.id, raw = %raw, "evaluator reply was not valid JSON");
                }
                let reason = match progress.current_check {
                    Some(kind) => format!("{}: {}", kind, e),
                    None => e.to_string(),
                };
                tracing::debug!(case = %tc.id, state = %progress.state, error = %reason, "case failed");
                reasons.push(reason);
                (
                    CaseState::Failed,
                    Some(progress.state),
                    Some(e.kind_str().to_string()),
                )
            }
        };
        let reason = (!reasons.is_empty()).then(|| reasons.join("; "));

        CaseResult {
            id: tc.id.clone(),
            state,
            failed_at,
            reason,
            error_kind,
            output: progress.output,
            checks: progress.checks,
            duration_ms,
        }
    }

    async fn drive_case(&self, tc: &TestCase, progress: &mut CaseProgress) -> Result<(), EvalError> {
        progress.state = CaseState::Hydrating;
        if let Some(problem) = case_problems(tc).into_iter().next() {
            return Err(problem);
        }
        let requested = tc.requested_checks();
        let input = tc
            .input
            .as_deref()
            .ok_or_else(|| EvalError::MissingInput { id: tc.id.clone() })?;
        let prompt = self
            .prompt_template
            .hydrate(&generation_bindings(input), self.settings.hydration)?;
        self.emit(CaseEvent::PromptHydrated {
            id: &tc.id,
            prompt: &prompt,
        });

        progress.state = CaseState::Generating;
        let resp = self
            .generator
            .generate(&self.settings.generator_model, &prompt, false)
            .await?;
        self.emit(CaseEvent::OutputGenerated {
            id: &tc.id,
            output: &resp.text,
        });
        let output = progress.output.insert(resp.text);

        progress.state = CaseState::Evaluating;
        let ctx = CheckContext {
            case: tc,
            input,
            output: output.as_str(),
        };
        for kind in requested {
            progress.current_check = Some(kind);
            let check = self.check_for(kind)?;
            let result = check.evaluate(&ctx).await?;
            self.emit(CaseEvent::CheckFinished {
                id: &tc.id,
                result: &result,
            });
            progress.checks.push(result);
        }
        progress.current_check = None;
        Ok(())
    }

    fn check_for(&self, kind: CheckKind) -> Result<&dyn Check, EvalError> {
        match kind {
            CheckKind::Keyword => Ok(&KeywordCheck as &dyn Check),
            CheckKind::Format => Ok(&FormatCheck as &dyn Check),
            CheckKind::Quality => self
                .quality
                .as_ref()
                .map(|q| q as &dyn Check)
                .ok_or_else(|| {
                    EvalError::CheckUnavailable(
                        CheckKind::Quality,
                        "no evaluation template was loaded".into(),
                    )
                }),
        }
    }
}
