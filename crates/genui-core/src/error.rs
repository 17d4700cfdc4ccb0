//! Error kinds surfaced by the core
//!
//! Every failure a generation can hit is classified into one of three
//! [`GenerationError`] kinds. View failures never touch the session state.

use std::path::PathBuf;

/// Failure of a Generation Client call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Connection, DNS, TLS or timeout failure
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Non-2xx status, an error payload, or a body that could not be decoded
    #[error("service failure{}: {message}", status_suffix(.status))]
    ServiceFailure {
        status: Option<u16>,
        message: String,
    },

    /// The service answered but produced no usable text
    #[error("service returned an empty response")]
    EmptyResponse,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl GenerationError {
    /// Short label used in notifications and logs
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::NetworkFailure(_) => "NetworkFailure",
            GenerationError::ServiceFailure { .. } => "ServiceFailure",
            GenerationError::EmptyResponse => "EmptyResponse",
        }
    }

    pub fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        GenerationError::ServiceFailure {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::service(
                err.status().map(|s| s.as_u16()),
                format!("malformed response body: {err}"),
            )
        } else if err.is_status() {
            GenerationError::service(err.status().map(|s| s.as_u16()), err.to_string())
        } else {
            // Timeouts, refused connections and broken bodies mid-transfer
            GenerationError::NetworkFailure(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("component description must not be empty")]
    EmptyDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A generation is already in flight; no queuing
    #[error("a generation is already in progress")]
    Busy,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("no code available yet")]
    NoCodeAvailable,

    #[error("failed to copy to clipboard: {0}")]
    ClipboardFailure(String),

    #[error("failed to export {path}: {source}")]
    ExportFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open preview: {0}")]
    PreviewFailure(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Http(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_failure_message_includes_status() {
        let err = GenerationError::service(Some(429), "quota exceeded");
        assert_eq!(err.to_string(), "service failure (429): quota exceeded");
        assert_eq!(err.kind(), "ServiceFailure");
    }

    #[test]
    fn test_service_failure_without_status() {
        let err = GenerationError::service(None, "bad payload");
        assert_eq!(err.to_string(), "service failure: bad payload");
    }
}
