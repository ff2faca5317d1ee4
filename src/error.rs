use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("repository not found: {0}")]
    NotFound(String),
    #[error("hosting platform error: {0}")]
    Hosting(String),
    #[error("diff fetch failed: {0}")]
    Fetch(String),
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
