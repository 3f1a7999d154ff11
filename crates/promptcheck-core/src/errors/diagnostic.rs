use super::EvalError;
use serde::{Deserialize, Serialize};

/// Operator-facing rendering of an error: what broke, where, and how to fix it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub context: serde_json::Value,
    pub fix_steps: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: serde_json::json!({}),
            fix_steps: vec![],
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn with_fix_step(mut self, step: impl Into<String>) -> Self {
        self.fix_steps.push(step.into());
        self
    }

    pub fn format_terminal(&self) -> String {
        let mut s = format!("❌ [{}] {}\n", self.code, self.message);

        if self.context.as_object().is_some_and(|o| !o.is_empty()) {
            if let Ok(json) = serde_json::to_string_pretty(&self.context) {
                for line in json.lines() {
                    s.push_str(&format!("  {}\n", line));
                }
            }
        }

        if !self.fix_steps.is_empty() {
            s.push_str("\nFix:\n");
            for (i, step) in self.fix_steps.iter().enumerate() {
                s.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }
        s
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_terminal())
    }
}

impl std::error::Error for Diagnostic {}

impl From<&EvalError> for Diagnostic {
    fn from(err: &EvalError) -> Self {
        match err {
            EvalError::MissingFile { path } => {
                Diagnostic::new(codes::E_PATH_NOT_FOUND, format!("Missing file {}", path.display()))
                    .with_context(serde_json::json!({ "path": path.display().to_string() }))
                    .with_fix_step("Check the path (relative paths resolve from the working directory)")
                    .with_fix_step("Override it with --prompt-template, --evaluation-template or --test-data")
            }
            EvalError::Io { path, source } => {
                Diagnostic::new(codes::E_IO, format!("Cannot read {}", path.display()))
                    .with_context(serde_json::json!({
                        "path": path.display().to_string(),
                        "error": source.to_string()
                    }))
            }
            EvalError::MissingCredential { var } => Diagnostic::new(
                codes::E_CREDENTIAL,
                format!("{} environment variable is not set", var),
            )
            .with_fix_step(format!("export {}=<your key>", var))
            .with_fix_step("Or run with --provider fake for an offline dry run"),
            EvalError::MalformedData { path, detail } => Diagnostic::new(
                codes::E_DATA_MALFORMED,
                format!("Malformed test data in {}", path.display()),
            )
            .with_context(serde_json::json!({
                "path": path.display().to_string(),
                "detail": detail
            }))
            .with_fix_step("The test data file must be a JSON array of objects, each with a string \"id\""),
            EvalError::Config(detail) => Diagnostic::new(codes::E_CFG, detail.clone()),
            EvalError::TemplateBinding { name } => Diagnostic::new(
                codes::E_TEMPLATE,
                format!("No value is bound for placeholder {{{}}}", name),
            ),
            other => Diagnostic::new(codes::E_CASE, other.to_string()),
        }
    }
}

pub mod codes {
    pub const E_PATH_NOT_FOUND: &str = "E_PATH_NOT_FOUND";
    pub const E_IO: &str = "E_IO";
    pub const E_CREDENTIAL: &str = "E_CREDENTIAL";
    pub const E_DATA_MALFORMED: &str = "E_DATA_MALFORMED";
    pub const E_CFG: &str = "E_CFG";
    pub const E_TEMPLATE: &str = "E_TEMPLATE";
    pub const E_CASE: &str = "E_CASE";
}
