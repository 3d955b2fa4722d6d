use reqwest::StatusCode;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("{0}")]
    Rejected(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("User not logged in")]
    NotLoggedIn,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Message carried in the backend's error body, if it sent one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            AppError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text shown to the person at the terminal.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Status {
                message: Some(msg), ..
            } => msg.clone(),
            AppError::Status { status, .. } => format!("Request failed ({})", status),
            AppError::Rejected(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::NotLoggedIn => "User not logged in. Please log in first.".to_string(),
            AppError::Transport(e) => e.to_string(),
            AppError::Storage(e) => {
                error!("storage error: {}", e);
                "Local storage error occurred".to_string()
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                "Local storage could not be initialised".to_string()
            }
            AppError::Decode(e) => format!("Unexpected response from backend: {}", e),
            AppError::Config(msg) => msg.clone(),
            AppError::Io(e) => e.to_string(),
        }
    }
}
