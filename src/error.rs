//! Error types for Synheart Cognilock

use thiserror::Error;

/// Errors that can occur while simulating or scoring a session
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown session mode: {0}")]
    UnknownMode(String),

    #[error("Invalid feature vector: {0}")]
    InvalidFeatures(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl EngineError {
    /// Stable machine-readable code for API and CLI diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnknownMode(_) => "UNKNOWN_MODE",
            EngineError::InvalidFeatures(_) => "INVALID_FEATURES",
            EngineError::Classifier(_) => "CLASSIFIER_ERROR",
            EngineError::Config(_) => "CONFIG_ERROR",
            EngineError::JsonError(_) => "JSON_ERROR",
        }
    }

    /// Whether the error was caused by the caller's input rather than the engine
    pub fn is_client_error(&self) -> bool {
        matches!(self, EngineError::UnknownMode(_) | EngineError::JsonError(_))
    }
}
