#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("body does not start with the opening boundary")]
    MissingOpeningBoundary,

    #[error("malformed delimiter line at byte {offset}")]
    MalformedDelimiter { offset: usize },

    #[error("part starting at byte {offset} is never terminated by a boundary")]
    UnterminatedPart { offset: usize },

    #[error("part starting at byte {offset} has no blank line after its headers")]
    MissingHeaderTerminator { offset: usize },

    #[error("malformed part header: {0}")]
    MalformedHeader(String),

    #[error("part has no Content-Disposition name")]
    MissingName,
}

pub type Result<T> = std::result::Result<T, DecodeError>;
