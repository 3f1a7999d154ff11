use super::super::args::ValidateArgs;
use super::report_fatal;
use crate::exit_codes::{EXIT_FAILURE, EXIT_SUCCESS};
use promptcheck_core::engine::SuiteInputs;
use promptcheck_core::template::Template;
use promptcheck_core::validate::validate;

fn describe_template(label: &str, t: &Template) {
    let path = t
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let names = t
        .placeholders()
        .iter()
        .map(|n| format!("{{{}}}", n))
        .collect::<Vec<_>>();
    if names.is_empty() {
        println!("{} template {}: no placeholders", label, path);
    } else {
        println!("{} template {}: {}", label, path, names.join(", "));
    }
}

pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    let cfg = match args.suite.resolve(None) {
        Ok(c) => c,
        Err(e) => return Ok(report_fatal(&e)),
    };
    let inputs = match SuiteInputs::load(&cfg) {
        Ok(i) => i,
        Err(e) => return Ok(report_fatal(&e)),
    };

    describe_template("Generation", &inputs.prompt_template);
    if let Some(t) = &inputs.evaluation_template {
        describe_template("Evaluation", t);
    }

    let report = validate(&inputs, cfg.hydration);
    println!("\n{} test case(s):", report.plans.len());
    for plan in &report.plans {
        let checks = plan
            .checks
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>();
        let checks = if checks.is_empty() {
            "(none)".to_string()
        } else {
            checks.join(", ")
        };
        println!("  {}: {}", plan.id, checks);
    }

    if report.is_clean() {
        println!("\nNo problems found.");
        return Ok(EXIT_SUCCESS);
    }
    eprintln!();
    for diag in &report.diagnostics {
        eprint!("{}", diag.format_terminal());
    }
    eprintln!("{} problem(s) found.", report.diagnostics.len());
    Ok(EXIT_FAILURE)
}
