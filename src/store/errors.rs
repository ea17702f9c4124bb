use thiserror::Error;

/// A store operation that ended in failure. Transport and server errors are
/// deliberately not distinguished; `message` is what the user gets to see.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{message}")]
    Failed {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            StoreError::Failed { message, .. } => message,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            StoreError::Failed { operation, .. } => operation,
        }
    }
}
