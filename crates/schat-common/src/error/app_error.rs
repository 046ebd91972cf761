//! Application error types
//!
//! Unified error handling for the command and UI layers built on the core.

use schat_core::DomainError;
use std::fmt;

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get error code for command responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Config(ConfigError::Validation(_)) => "CONFIG_VALIDATION_ERROR",
            Self::Config(ConfigError::InvalidValue(..)) => "CONFIG_ERROR",
            Self::Tracing(_) => "TRACING_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the chatter caused this error and should be shown its message
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Domain(e) => {
                e.is_not_found()
                    || e.is_authorization()
                    || e.is_validation()
                    || e.is_conflict()
                    || matches!(e, DomainError::NoActiveChannel | DomainError::Cancelled(_))
            }
            Self::Config(_) | Self::Tracing(_) | Self::Internal(_) => false,
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Create an internal error from a message
    #[must_use]
    pub fn internal_msg(msg: impl fmt::Display) -> Self {
        Self::Internal(anyhow::anyhow!("{msg}"))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
