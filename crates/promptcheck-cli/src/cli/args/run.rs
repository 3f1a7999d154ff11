//! Run and validate command arguments.

use std::path::PathBuf;

use clap::Parser;

use super::{GatewayArgs, SuiteArgs};

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    #[command(flatten)]
    pub gateway: GatewayArgs,

    /// Print each hydrated generation prompt before it is sent
    #[arg(long)]
    pub show_prompts: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Reply used by the fake generator
    #[arg(long, hide = true, allow_hyphen_values = true)]
    pub fake_output: Option<String>,

    /// Reply used by the fake evaluator
    #[arg(long, hide = true, allow_hyphen_values = true)]
    pub fake_evaluation: Option<String>,
}

#[derive(Parser, Clone, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,
}
