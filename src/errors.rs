use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    /// A single resolver provider rejected the request.
    #[error("{0}")]
    Provider(String),

    /// Every provider in the list failed; carries the last recorded failure.
    #[error("{0}")]
    ProvidersExhausted(String),

    #[error("Unsupported link format")]
    UnsupportedFormat,

    #[error("Unable to resolve this video. Check that the link is correct, or try again.")]
    CannotResolve,

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Text shown to the person who submitted the link.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the pipeline ran to a terminal verdict, as opposed to an
    /// infrastructure problem (bad config, IO).
    pub fn is_terminal_resolution(&self) -> bool {
        matches!(self, AppError::UnsupportedFormat | AppError::CannotResolve)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
