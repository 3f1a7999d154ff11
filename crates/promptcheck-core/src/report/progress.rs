//! Per-case events emitted by the runner while a suite executes.

use crate::checks::CheckResult;
use crate::model::CaseResult;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub enum CaseEvent<'a> {
    Started {
        index: usize,
        total: usize,
        id: &'a str,
    },
    PromptHydrated {
        id: &'a str,
        prompt: &'a str,
    },
    OutputGenerated {
        id: &'a str,
        output: &'a str,
    },
    CheckFinished {
        id: &'a str,
        result: &'a CheckResult,
    },
    Finished {
        result: &'a CaseResult,
    },
}

/// Sink for case events. The runner calls it synchronously, in order.
pub type EventSink = Arc<dyn Fn(&CaseEvent<'_>) + Send + Sync>;
