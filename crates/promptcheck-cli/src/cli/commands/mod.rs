use super::args::*;
use promptcheck_core::errors::{Diagnostic, EvalError};

pub(crate) mod gateway_builder;
pub(crate) mod run;
pub mod validate;

use crate::exit_codes::{EXIT_FAILURE, EXIT_SUCCESS};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Validate(args) => validate::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Renders a startup error on stderr and yields the failure exit code.
pub(crate) fn report_fatal(err: &EvalError) -> i32 {
    tracing::debug!(kind = err.kind_str(), "aborting before any case runs");
    eprint!("{}", Diagnostic::from(err).format_terminal());
    EXIT_FAILURE
}
