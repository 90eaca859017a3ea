//! Error types for the spotlight service
//!
//! Retrieval and render faults are recovered close to where they happen, so
//! most of these only ever show up in logs. anyhow carries them across the
//! crate boundary.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific leaderboard scenarios
#[derive(Debug, thiserror::Error)]
pub enum SpotlightError {
    #[error("Stats retrieval failed: {message}")]
    RetrievalFault { message: String },

    #[error("Render delivery failed: {message}")]
    RenderFault { message: String },

    #[error("Malformed action token: {token}")]
    MalformedAction { token: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl SpotlightError {
    /// Wrap any persistence error as a retrieval fault
    pub fn retrieval(err: impl std::fmt::Display) -> Self {
        Self::RetrievalFault {
            message: err.to_string(),
        }
    }

    pub fn malformed(token: &str) -> Self {
        Self::MalformedAction {
            token: token.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}
