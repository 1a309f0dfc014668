use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    #[error("frontmatter must be a key/value mapping")]
    NotAMapping,

    #[error("frontmatter is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("status must be \"draft\" or \"send\", got \"{0}\"")]
    InvalidStatus(String),
}

pub type Result<T> = std::result::Result<T, NoteError>;
