//! Error types for the record handler

pub type Result<T> = std::result::Result<T, HandlerError>;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Sink write failure, surfaced unchanged from the writer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Level name that does not parse
    #[error("Invalid log level: '{0}'")]
    InvalidLevel(String),

    /// Color specification that does not parse
    #[error("Invalid color: '{0}'")]
    InvalidColor(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        HandlerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HandlerError::Other(msg.into())
    }
}
