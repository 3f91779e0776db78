//! Error types for ReviewPilot

/// Result type alias using ReviewPilot's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ReviewPilot operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pluggable model was never loaded
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// A loaded model failed during a single call
    #[error("inference error: {0}")]
    Inference(String),

    /// Reply catalog errors
    #[error("template error: {0}")]
    Template(String),

    /// Review or cache store errors
    #[error("store error: {0}")]
    Store(String),

    /// Requested record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching the pipeline
    #[error("validation error: {0}")]
    Validation(String),

    /// Feature switched off by configuration
    #[error("feature disabled: {0}")]
    FeatureDisabled(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn feature_disabled(msg: impl Into<String>) -> Self {
        Self::FeatureDisabled(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
