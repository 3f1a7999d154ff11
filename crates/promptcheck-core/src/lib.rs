//! Evaluation harness for LLM summarization prompts.
//!
//! Loads a generation template and a set of test cases, sends each hydrated
//! prompt to a generator model, checks the output (keyword, format, and an
//! evaluator-model quality grade) and reduces everything to a [`report::RunReport`].

pub mod checks;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod evaluation;
pub mod gateway;
pub mod model;
pub mod report;
pub mod template;
pub mod validate;

pub use errors::{EvalError, GatewayError};
