use tch::TchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SifRankError {
    #[error("Tagging error: {0}")]
    TaggingError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Invalid request error: {0}")]
    InvalidRequestError(String),

    #[error("Invalid configuration error: {0}")]
    InvalidConfigurationError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Tch tensor error: {0}")]
    TchError(String),

    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl From<std::io::Error> for SifRankError {
    fn from(error: std::io::Error) -> Self {
        SifRankError::IOError(error.to_string())
    }
}

impl From<TchError> for SifRankError {
    fn from(error: TchError) -> Self {
        SifRankError::TchError(error.to_string())
    }
}

impl From<serde_json::Error> for SifRankError {
    fn from(error: serde_json::Error) -> Self {
        SifRankError::SerdeError(error.to_string())
    }
}
