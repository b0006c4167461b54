use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("LOAD_FAILED: {0}")]
    Load(String),
    #[error("VALIDATION: {0}")]
    Validation(String),
    #[error("NETWORK: {0}")]
    Network(String),
    #[error("REMOTE_MUTATION: {0}")]
    RemoteMutation(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("BUSY: {0}")]
    Busy(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to the user, without the wire-code prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Load(message)
            | Self::Validation(message)
            | Self::Network(message)
            | Self::RemoteMutation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
