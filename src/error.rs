use crate::pipeline::DecodeError;
use crate::transport::NetworkError;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.base_url", "request.endpoint")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_config", "session_api")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-2xx reply from the backend.
///
/// Keeps everything the caller may want to inspect or log: the status line,
/// the response headers and whatever body text could be read.
#[derive(Debug, Clone, Error)]
#[error("HTTP {} {status_text} :: {body}", .status.as_u16())]
pub struct ChatTransportError {
    pub status: StatusCode,
    /// Canonical reason phrase for `status`; the server's own phrase is not
    /// available from the HTTP client. Empty for non-standard codes.
    pub status_text: String,
    pub headers: HeaderMap,
    /// Best-effort body text; empty when the body could not be read.
    pub body: String,
}

impl ChatTransportError {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.into(),
        }
    }
}

/// Unified error type for the chat transport.
///
/// The variant is decided where the underlying failure is caught, so callers
/// can match on it instead of probing the error's shape.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Transport error: {0}")]
    Transport(#[from] ChatTransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when the failure was caused by the caller's cancellation handle.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Network(NetworkError::Cancelled))
    }

    /// HTTP status of a non-2xx reply, if that is what this error is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport(e) => Some(e.status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(DecodeError::Json(e))
    }
}
