use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnveilError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("No original state saved for element: {0}")]
    NoSnapshot(String),

    #[error("Companion injection failed: {0}")]
    InjectionFailed(String),

    #[error("Page not loaded: {0}")]
    PageNotFound(String),

    #[error("Invalid page capture: {0}")]
    CaptureError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, UnveilError>;
