use clap::{Parser, Subcommand};

pub mod common;
pub mod run;
pub use common::*;
pub use run::*;

#[derive(Parser)]
#[command(
    name = "promptcheck",
    version,
    about = "Evaluation harness for LLM summarization prompts"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate, check and score every test case
    Run(RunArgs),
    /// Check templates and test data without calling any model
    Validate(ValidateArgs),
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "promptcheck",
            "run",
            "--test-data",
            "data.json",
            "--provider",
            "fake",
            "--threshold",
            "4",
            "--strict-templates",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.cmd {
            Command::Run(args) => {
                assert_eq!(args.suite.test_data.as_deref(), Some(std::path::Path::new("data.json")));
                assert_eq!(args.gateway.provider, Some(ProviderArg::Fake));
                assert_eq!(args.suite.threshold, Some(4));
                assert!(args.suite.strict_templates);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn fake_replies_accept_leading_dash() {
        let cli = Cli::try_parse_from([
            "promptcheck",
            "run",
            "--fake-output",
            "- bullet one",
            "--fake-evaluation",
            "-1",
        ])
        .unwrap();
        match cli.cmd {
            Command::Run(args) => {
                assert_eq!(args.fake_output.as_deref(), Some("- bullet one"));
                assert_eq!(args.fake_evaluation.as_deref(), Some("-1"));
            }
            _ => panic!("expected run"),
        }
    }
}
