use std::fmt;

use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Shown when a failed response carried no readable body.
pub const NO_BODY: &str = "no response body";

#[derive(Debug, Error)]
pub enum StoreClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Http(#[from] HttpFailure),
    #[error("User is not authenticated")]
    Unauthenticated,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl StoreClientError {
    /// Failures that mean the stored session can no longer be used.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            StoreClientError::Unauthenticated => true,
            StoreClientError::Http(failure) => matches!(
                failure.status(),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ),
            _ => false,
        }
    }
}

/// Non-success HTTP response, with whatever message the body offered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct HttpFailure {
    status: u16,
    message: Option<String>,
}

impl HttpFailure {
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Consumes a failed response and extracts its message.
    pub async fn from_response(response: Response) -> Self {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(body) => failure_message(&body),
            Err(_) => None,
        };
        Self { status, message }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(NO_BODY)
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP error {}: {}", self.status, self.message())
    }
}

/// Best-effort message from an error body: a JSON `error` or `message`
/// field, otherwise the raw text, otherwise nothing.
pub fn failure_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(body) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(text)) = fields.get(key) {
                if !text.trim().is_empty() {
                    return Some(text.clone());
                }
            }
        }
    }

    Some(body.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Price must not be negative")]
    NegativePrice,
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
