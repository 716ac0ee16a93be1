//! Error types shared by the core modules

use thiserror::Error;

/// Failures the app can run into. None of them is fatal: callers log the
/// error and keep the state they had before the operation.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read persisted data: {0}")]
    PersistenceRead(String),
    #[error("failed to persist data: {0}")]
    PersistenceWrite(String),
    #[error("failed to fetch QR image: {0}")]
    ImageFetch(String),
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
    #[error("failed to save file: {0}")]
    FileSave(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::ImageFetch(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
