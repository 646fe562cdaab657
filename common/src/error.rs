use thiserror::Error;

/// Failure classes for the control core.
///
/// `Config` is fatal at startup only; everything else is recoverable and the
/// control loop keeps running through it.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("transient i/o error: {0}")]
    TransientIo(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ControlError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientIo(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
