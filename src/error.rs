use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Index {index} out of range for corpus of {len} recipes")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Embedding capability error: {0}")]
    Capability(#[from] EmbeddingError),

    #[error("Index build error: {0}")]
    Index(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    /// Filters out potentially sensitive information
    pub fn log_safe(&self) -> String {
        match self {
            // Provider errors may echo the endpoint or the API key back
            Error::Capability(_) => "Embedding provider failed".to_string(),
            Error::Http(_) => "External HTTP request failed".to_string(),

            Error::Internal(msg) => {
                if msg.to_lowercase().contains("password")
                    || msg.to_lowercase().contains("secret")
                    || msg.to_lowercase().contains("token")
                    || msg.to_lowercase().contains("key")
                {
                    "Internal error (details redacted)".to_string()
                } else {
                    format!("Internal error: {msg}")
                }
            }

            Error::DataLoad(msg) => format!("Data load error: {msg}"),
            Error::IndexOutOfRange { index, len } => {
                format!("Index {index} out of range ({len} recipes)")
            }
            Error::Index(msg) => format!("Index build error: {msg}"),
            Error::Json(_) => "JSON processing failed".to_string(),
            Error::InvalidUrl(_) => "Invalid URL provided".to_string(),
            Error::Io(_) => "File system operation failed".to_string(),
            Error::Config(msg) => format!("Configuration error: {msg}"),
            Error::NotFound(msg) => format!("Not found: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
        }
    }
}

// Implement IntoResponse for API error handling
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("Request error: {}", self.log_safe());

        let (status, error_message) = match &self {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::IndexOutOfRange { index, .. } => {
                (StatusCode::NOT_FOUND, format!("Recipe {index} not found"))
            }
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Capability(_) | Error::Http(_) => (
                StatusCode::BAD_GATEWAY,
                "External service error".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
