use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("missing setup: {0}")]
    MissingSetup(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("store failure: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("language model call failed: {0}")]
    Llm(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

pub type GameResult<T> = std::result::Result<T, GameError>;
