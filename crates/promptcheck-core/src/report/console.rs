use crate::checks::CheckResult;
use crate::model::CaseResult;
use crate::report::progress::{CaseEvent, EventSink};
use crate::report::RunReport;
use std::sync::Arc;

pub const PASSED_LINE: &str = "--- All evaluations PASSED. ---";
pub const FAILED_LINE: &str = "--- Evaluation FAILED. ---";

fn mark(passed: bool) -> &'static str {
    if passed {
        "✅"
    } else {
        "❌"
    }
}

fn format_check(result: &CheckResult) -> String {
    let mut line = format!("  {} {}: {}", mark(result.passed), result.kind, result.message);
    if let Some(verdict) = &result.verdict {
        for d in &verdict.dimensions {
            line.push_str(&format!("\n      {} score: {}/5", d.name, d.score));
            if let Some(reason) = &d.reasoning {
                line.push_str(&format!(" ({})", reason));
            }
        }
    }
    line
}

fn format_case_end(result: &CaseResult) -> String {
    if result.passed() {
        return format!("{} {} PASSED ({} ms)", mark(true), result.id, result.duration_ms);
    }
    let at = result
        .failed_at
        .map(|s| format!(" at {}", s))
        .unwrap_or_default();
    match &result.reason {
        Some(reason) => format!("{} {} FAILED{}: {}", mark(false), result.id, at, reason),
        None => format!("{} {} FAILED{}", mark(false), result.id, at),
    }
}

/// Render one runner event as console lines. `None` means the event is not shown.
#[must_use]
pub fn format_event(ev: &CaseEvent<'_>, show_prompts: bool) -> Option<String> {
    match ev {
        CaseEvent::Started { index, total, id } => Some(format!(
            "\n--- Running Test Case {}/{}: {} ---",
            index + 1,
            total,
            id
        )),
        CaseEvent::PromptHydrated { prompt, .. } if show_prompts => {
            Some(format!("Prompt sent to generator:\n{}", prompt))
        }
        CaseEvent::PromptHydrated { .. } => None,
        CaseEvent::OutputGenerated { output, .. } => {
            Some(format!("Generated output:\n{}", output))
        }
        CaseEvent::CheckFinished { result, .. } => Some(format_check(result)),
        CaseEvent::Finished { result } => Some(format_case_end(result)),
    }
}

/// Sink that prints the line-oriented run trace to stdout.
pub fn console_sink(show_prompts: bool) -> EventSink {
    Arc::new(move |ev: &CaseEvent<'_>| {
        if let Some(text) = format_event(ev, show_prompts) {
            println!("{}", text);
        }
    })
}

#[must_use]
pub fn format_summary(report: &RunReport) -> String {
    let mut out = format!(
        "\n=== Summary: {}/{} passed (threshold {}) ===\n",
        report.passed, report.total, report.threshold
    );
    for r in &report.results {
        out.push_str(&format_case_end(r));
        out.push('\n');
    }
    let failed: Vec<&str> = report.failed_cases().map(|r| r.id.as_str()).collect();
    if !failed.is_empty() {
        out.push_str(&format!("Failed cases: {}\n", failed.join(", ")));
    }
    out.push_str(if report.any_failed {
        FAILED_LINE
    } else {
        PASSED_LINE
    });
    out
}

pub fn print_summary(report: &RunReport) {
    println!("{}", format_summary(report));
}
