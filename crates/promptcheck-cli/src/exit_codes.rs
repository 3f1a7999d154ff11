//! Process exit codes. Part of the CLI contract used by CI pipelines.

/// Every case passed every requested check.
pub const EXIT_SUCCESS: i32 = 0;
/// At least one case failed, or the run could not start.
pub const EXIT_FAILURE: i32 = 1;
