use std::io;
use std::path::PathBuf;

/// Every way a submission or option lookup can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("authentication failed: the API token is invalid, check your settings")]
    Unauthorized,

    /// Server-side validation messages, one per line when displayed.
    #[error("{}", .0.join("\n"))]
    ValidationFailed(Vec<String>),

    #[error("network error: {0}")]
    Transport(String),

    #[error("unexpected error (HTTP {0})")]
    UnexpectedStatus(u16),

    #[error("unexpected response shape: {0}")]
    MalformedResponseShape(String),
}

impl SubmissionError {
    /// One entry per user-visible notice.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::ValidationFailed(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

pub type Result<T> = std::result::Result<T, SubmissionError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings from '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("API token is not set")]
    MissingToken,

    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl { url: String, source: url::ParseError },
}
