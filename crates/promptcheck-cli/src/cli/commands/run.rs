use super::super::args::RunArgs;
use super::gateway_builder::{build_gateways, FakeReplies};
use super::report_fatal;
use crate::exit_codes::{EXIT_FAILURE, EXIT_SUCCESS};
use anyhow::Context;
use promptcheck_core::engine::{RunSettings, Runner, SuiteInputs};
use promptcheck_core::report::console::{console_sink, print_summary};
use promptcheck_core::report::json::write_json;

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let cfg = match args.suite.resolve(Some(&args.gateway)) {
        Ok(c) => c,
        Err(e) => return Ok(report_fatal(&e)),
    };

    let fake = FakeReplies {
        output: args.fake_output.clone(),
        evaluation: args.fake_evaluation.clone(),
    };
    let gateways = match build_gateways(&cfg, &fake) {
        Ok(g) => g,
        Err(e) => return Ok(report_fatal(&e)),
    };

    let inputs = match SuiteInputs::load(&cfg) {
        Ok(i) => i,
        Err(e) => return Ok(report_fatal(&e)),
    };
    tracing::info!(
        cases = inputs.cases.len(),
        provider = cfg.gateway.provider.as_str(),
        generator = %cfg.generator_model,
        evaluator = %cfg.evaluator_model,
        "suite loaded"
    );

    let mut runner = Runner::new(
        gateways.generator,
        gateways.evaluator,
        inputs.prompt_template,
        RunSettings::from(&cfg),
    )
    .with_event_sink(console_sink(args.show_prompts));
    if let Some(t) = inputs.evaluation_template {
        runner = runner.with_evaluation_template(t);
    }

    let report = runner.run_suite(&inputs.cases).await;
    print_summary(&report);

    if let Some(path) = &args.report_json {
        write_json(&report, path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    Ok(if report.any_failed {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    })
}
