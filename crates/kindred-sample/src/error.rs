//! Error types of the sample kinds.

use kindred_framework::FrameworkError;

/// Errors of the typed reference owner and its targets.
#[derive(Debug, thiserror::Error)]
pub enum TestModelError {
    #[error("Test model not found: {0}")]
    NotFound(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Reference not set: {0}")]
    MissingReference(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for TestModelError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound { .. } => TestModelError::NotFound(e.to_string()),
            FrameworkError::InvalidReference { .. } => TestModelError::InvalidReference(e.to_string()),
            FrameworkError::MissingReference { .. } => TestModelError::MissingReference(e.to_string()),
            other => TestModelError::ActorCommunicationError(other.to_string()),
        }
    }
}

/// Errors of the signaling kind.
#[derive(Debug, thiserror::Error)]
pub enum SignalingError {
    #[error("Signaling record not found: {0}")]
    NotFound(String),

    /// A receiver or wrapper refused the operation.
    #[error("Signaling validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for SignalingError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound { .. } => SignalingError::NotFound(e.to_string()),
            FrameworkError::Hook { source, .. } => SignalingError::ValidationError(source.to_string()),
            FrameworkError::Vetoed { .. } => SignalingError::ValidationError(e.to_string()),
            other => SignalingError::ActorCommunicationError(other.to_string()),
        }
    }
}

/// Errors raised while starting the system.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Setup(#[from] kindred_framework::SetupError),

    #[error(transparent)]
    Config(#[from] kindred_framework::ConfigError),
}
