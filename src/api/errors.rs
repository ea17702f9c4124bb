//! Errors raised while talking to the birthday service

use thiserror::Error;

/// Shown when the service gives no message of its own
pub const GENERIC_FAILURE: &str = "Something went wrong";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in. Run `birthday-book login` and set BIRTHDAY_BOOK_TOKEN")]
    MissingToken,

    #[error("Service error (status {status}): {}", or_generic(.message))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode service response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Human-readable message for a toast: the server's own message when it sent one
    pub fn user_message(&self) -> String {
        self.user_message_or(GENERIC_FAILURE)
    }

    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::MissingToken => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

fn or_generic(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(GENERIC_FAILURE)
}
