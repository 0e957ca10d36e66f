use llm::LLMError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Completion(#[from] LLMError),
    #[error("{message}")]
    Parse { message: String, raw: String },
    #[error("A story with this title already exists.")]
    Duplicate,
    #[error("story not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoryError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<std::io::Error> for StoryError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

pub type Result<T, E = StoryError> = std::result::Result<T, E>;
