pub mod diagnostic;

pub use diagnostic::Diagnostic;

use crate::checks::CheckKind;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Transport,
    Timeout,
    RateLimited,
    Server,
    Status,
    MalformedResponse,
    Other,
}

impl GatewayErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GatewayErrorKind::Transport => "transport",
            GatewayErrorKind::Timeout => "timeout",
            GatewayErrorKind::RateLimited => "rate_limited",
            GatewayErrorKind::Server => "server",
            GatewayErrorKind::Status => "status",
            GatewayErrorKind::MalformedResponse => "malformed_response",
            GatewayErrorKind::Other => "other",
        }
    }

    /// Kinds worth another attempt when a retry budget is configured.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            GatewayErrorKind::Transport
                | GatewayErrorKind::Timeout
                | GatewayErrorKind::RateLimited
                | GatewayErrorKind::Server
        )
    }
}

/// Transport or remote-side failure of a single model call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{provider} gateway error ({}): {message}", .kind.as_str())]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    pub provider: String,
    pub status: Option<u16>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: provider.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Transport, provider, message)
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, provider, message)
    }

    pub fn malformed_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::MalformedResponse, provider, message)
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let kind = match status {
            429 => GatewayErrorKind::RateLimited,
            500..=599 => GatewayErrorKind::Server,
            _ => GatewayErrorKind::Status,
        };
        let body = body.into();
        let message = if body.trim().is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body.trim())
        };
        Self::new(kind, provider, message).with_status(status)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("missing file: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    #[error("malformed test data in {}: {detail}", .path.display())]
    MalformedData { path: PathBuf, detail: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("template binding error: no value bound for placeholder {{{name}}}")]
    TemplateBinding { name: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("evaluator did not return valid JSON: {detail}")]
    InvalidEvaluationFormat { detail: String, raw: String },

    #[error("unknown format rule '{0}'")]
    UnknownFormatRule(String),

    #[error("test case '{id}' requests the {check} check but has no '{field}' field")]
    MissingField {
        id: String,
        check: CheckKind,
        field: &'static str,
    },

    #[error("test case '{id}' has no 'input' field")]
    MissingInput { id: String },

    #[error("test case '{0}' requests no checks")]
    NoChecksRequested(String),

    #[error("{0} check is not available: {1}")]
    CheckUnavailable(CheckKind, String),
}

impl EvalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            EvalError::MissingFile { path }
        } else {
            EvalError::Io { path, source }
        }
    }

    /// Fatal errors abort the whole run before any case executes.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EvalError::MissingFile { .. }
                | EvalError::Io { .. }
                | EvalError::MissingCredential { .. }
                | EvalError::MalformedData { .. }
                | EvalError::Config(_)
        )
    }

    /// Stable snake_case label used in reports.
    pub fn kind_str(&self) -> &'static str {
        match self {
            EvalError::MissingFile { .. } => "missing_file",
            EvalError::Io { .. } => "io",
            EvalError::MissingCredential { .. } => "missing_credential",
            EvalError::MalformedData { .. } => "malformed_data",
            EvalError::Config(_) => "config",
            EvalError::TemplateBinding { .. } => "template_binding",
            EvalError::Gateway(_) => "gateway",
            EvalError::InvalidEvaluationFormat { .. } => "invalid_evaluation_format",
            EvalError::UnknownFormatRule(_) => "unknown_format_rule",
            EvalError::MissingField { .. } => "missing_field",
            EvalError::MissingInput { .. } => "missing_input",
            EvalError::NoChecksRequested(_) => "no_checks_requested",
            EvalError::CheckUnavailable(..) => "check_unavailable",
        }
    }
}
