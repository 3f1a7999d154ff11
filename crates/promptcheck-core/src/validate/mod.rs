//! Offline checks over loaded suite inputs. No model is contacted.

use crate::checks::{CheckKind, FormatRule};
use crate::engine::SuiteInputs;
use crate::errors::diagnostic::{codes, Diagnostic};
use crate::errors::EvalError;
use crate::model::TestCase;
use crate::template::{HydrationMode, Template};

const GENERATION_KEYS: [&str; 3] = ["input", "article", "article_text"];
const EVALUATION_KEYS: [&str; 3] = ["input", "ideal_output", "output"];

#[derive(Debug, Clone)]
pub struct CasePlan {
    pub id: String,
    pub checks: Vec<CheckKind>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateReport {
    pub plans: Vec<CasePlan>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidateReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Problems that would fail this case regardless of what the models reply.
pub fn case_problems(tc: &TestCase) -> Vec<EvalError> {
    let requested = tc.requested_checks();
    let mut problems = Vec::new();
    if requested.is_empty() {
        problems.push(EvalError::NoChecksRequested(tc.id.clone()));
    }
    if tc.input.is_none() {
        problems.push(EvalError::MissingInput { id: tc.id.clone() });
    }
    if requested.contains(&CheckKind::Keyword) && tc.expected_keyword.is_none() {
        problems.push(EvalError::MissingField {
            id: tc.id.clone(),
            check: CheckKind::Keyword,
            field: "expected_keyword",
        });
    }
    if requested.contains(&CheckKind::Format) {
        match tc.expected_format.as_deref() {
            None => problems.push(EvalError::MissingField {
                id: tc.id.clone(),
                check: CheckKind::Format,
                field: "expected_format",
            }),
            Some(name) => {
                if let Err(e) = FormatRule::parse(name) {
                    problems.push(e);
                }
            }
        }
    }
    problems
}

fn template_diagnostics(
    label: &str,
    template: &Template,
    known: &[&str],
    mode: HydrationMode,
) -> Vec<Diagnostic> {
    // Unbound markers are only an error under strict hydration.
    if mode != HydrationMode::Strict {
        return Vec::new();
    }
    template
        .placeholders()
        .into_iter()
        .filter(|name| !known.contains(&name.as_str()))
        .map(|name| {
            let path = template
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            Diagnostic::from(&EvalError::TemplateBinding { name: name.clone() })
                .with_context(serde_json::json!({ "template": label, "path": path }))
                .with_fix_step(format!(
                    "Use one of the bound placeholders: {}",
                    known
                        .iter()
                        .map(|k| format!("{{{}}}", k))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
        })
        .collect()
}

pub fn validate(inputs: &SuiteInputs, mode: HydrationMode) -> ValidateReport {
    let mut report = ValidateReport::default();

    report.diagnostics.extend(template_diagnostics(
        "generation",
        &inputs.prompt_template,
        &GENERATION_KEYS,
        mode,
    ));
    if let Some(t) = &inputs.evaluation_template {
        report
            .diagnostics
            .extend(template_diagnostics("evaluation", t, &EVALUATION_KEYS, mode));
    }

    for tc in &inputs.cases {
        report.plans.push(CasePlan {
            id: tc.id.clone(),
            checks: tc.requested_checks(),
        });
        for problem in case_problems(tc) {
            report.diagnostics.push(
                Diagnostic::new(codes::E_CASE, problem.to_string())
                    .with_context(serde_json::json!({ "id": tc.id, "kind": problem.kind_str() })),
            );
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(cases: Vec<TestCase>, prompt: &str) -> SuiteInputs {
        SuiteInputs {
            cases,
            prompt_template: Template::from_text(prompt),
            evaluation_template: None,
        }
    }

    #[test]
    fn clean_suite_has_no_diagnostics() {
        let i = inputs(
            vec![TestCase::new("t1", "a").with_format("starts_with_bullet")],
            "Summarize: {article}",
        );
        let r = validate(&i, HydrationMode::Strict);
        assert!(r.is_clean());
        assert_eq!(r.plans[0].checks, vec![CheckKind::Format]);
    }

    #[test]
    fn flags_case_level_problems() {
        let mut no_input = TestCase::new("t3", "x").with_keyword("k");
        no_input.input = None;
        let i = inputs(
            vec![
                TestCase::new("t1", "a"),
                TestCase::new("t2", "a").with_format("numbered"),
                no_input,
                TestCase::new("t4", "a").with_checks(vec![CheckKind::Keyword]),
            ],
            "{input}",
        );
        let r = validate(&i, HydrationMode::Literal);
        let msgs: Vec<String> = r.diagnostics.iter().map(|d| d.message.clone()).collect();
        assert_eq!(msgs.len(), 4);
        assert!(msgs[0].contains("requests no checks"));
        assert!(msgs[1].contains("unknown format rule 'numbered'"));
        assert!(msgs[2].contains("has no 'input' field"));
        assert!(msgs[3].contains("expected_keyword"));
    }

    #[test]
    fn unknown_placeholder_only_flagged_in_strict_mode() {
        let i = inputs(vec![TestCase::new("t1", "a").with_keyword("k")], "{input} {topic}");
        assert!(validate(&i, HydrationMode::Literal).is_clean());
        let strict = validate(&i, HydrationMode::Strict);
        assert_eq!(strict.diagnostics.len(), 1);
        assert!(strict.diagnostics[0].message.contains("{topic}"));
    }
}
