use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("container signature does not match declared media type: {0}")]
    UnsupportedContainer(String),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("invalid text encoding: {0}")]
    InvalidEncoding(String),

    #[error("extraction cancelled")]
    Cancelled,
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
