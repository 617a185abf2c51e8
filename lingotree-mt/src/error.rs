use lingotree::TreeError;
use thiserror::Error;

/// Errors raised by configuration, translation providers and the batch runner
#[derive(Debug, Error)]
pub enum MtError {
    /// Endpoint, key or model missing, or an invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A run was requested with no item selected
    #[error("No items selected for translation")]
    EmptySelection,

    /// A second run was requested while one is in progress
    #[error("A translation run is already in progress")]
    AlreadyRunning,

    /// Transport failure talking to the endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("Endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Request aborted by the user
    #[error("Translation cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MtError {
    /// Cancellation ends a run cleanly and is never reported as a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MtError::Cancelled)
    }
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::Network(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cancelled() {
        assert!(MtError::Cancelled.is_cancelled());
        assert!(!MtError::EmptySelection.is_cancelled());
        assert!(!MtError::Network("reset".to_string()).is_cancelled());
    }

    #[test]
    fn test_http_error_message() {
        let err = MtError::Http {
            status: 429,
            body: "rate limited".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
    }

    #[test]
    fn test_tree_error_is_transparent() {
        let err: MtError = TreeError::parse(lingotree::DocumentFormat::Json, "eof").into();
        assert_eq!(err.to_string(), "Invalid JSON: eof");
    }
}
