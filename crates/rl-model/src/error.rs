use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid module code: {0:?}")]
    InvalidModuleCode(String),
    #[error("resolve list {uri}: {message}")]
    Resolve { uri: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Build a resolution failure for the given list identifier.
    pub fn resolve(uri: impl Into<String>, message: impl ToString) -> Self {
        Self::Resolve {
            uri: uri.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
