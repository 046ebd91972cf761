//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

use crate::entities::TargetsError;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Chatter not found: {0}")]
    ChatterNotFound(Uuid),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid channel key: '{0}'")]
    InvalidChannelKey(String),

    #[error("Invalid target id: '{0}'")]
    InvalidTargetId(String),

    #[error(transparent)]
    Targets(#[from] TargetsError),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Access denied to channel '{channel}': missing permission {permission}")]
    AccessDenied { channel: String, permission: String },

    #[error("Cannot leave forced channel: {0}")]
    CannotLeaveForcedChannel(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("A channel with the key '{0}' already exists")]
    DuplicateChannel(String),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("No active channel to send the message to")]
    NoActiveChannel,

    #[error("{0} was cancelled by an event handler")]
    Cancelled(&'static str),
}

impl DomainError {
    /// Get an error code string for the command/UI layer
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::ChatterNotFound(_) => "UNKNOWN_CHATTER",

            // Validation
            Self::InvalidChannelKey(_) => "INVALID_CHANNEL_KEY",
            Self::InvalidTargetId(_) => "INVALID_TARGET_ID",
            Self::Targets(_) => "UNMODIFIABLE_TARGETS",

            // Authorization
            Self::AccessDenied { .. } => "ACCESS_DENIED",
            Self::CannotLeaveForcedChannel(_) => "CANNOT_LEAVE_FORCED_CHANNEL",

            // Conflict
            Self::DuplicateChannel(_) => "DUPLICATE_CHANNEL",

            // Business Rules
            Self::NoActiveChannel => "NO_ACTIVE_CHANNEL",
            Self::Cancelled(_) => "CANCELLED",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound(_) | Self::ChatterNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidChannelKey(_) | Self::InvalidTargetId(_) | Self::Targets(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied { .. } | Self::CannotLeaveForcedChannel(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateChannel(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::ChannelNotFound("global".to_string());
        assert_eq!(err.code(), "UNKNOWN_CHANNEL");

        let err = DomainError::AccessDenied {
            channel: "vip".to_string(),
            permission: "schat.channel.vip.join".to_string(),
        };
        assert_eq!(err.code(), "ACCESS_DENIED");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::ChannelNotFound("x".to_string()).is_not_found());
        assert!(DomainError::ChatterNotFound(Uuid::nil()).is_not_found());
        assert!(!DomainError::NoActiveChannel.is_not_found());
    }

    #[test]
    fn test_classification_is_disjoint() {
        let denied = DomainError::AccessDenied {
            channel: "vip".to_string(),
            permission: "p".to_string(),
        };
        assert!(denied.is_authorization());
        assert!(!denied.is_validation());

        let invalid = DomainError::InvalidChannelKey("a b".to_string());
        assert!(invalid.is_validation());
        assert!(!invalid.is_authorization());

        assert!(DomainError::DuplicateChannel("global".to_string()).is_conflict());
        assert!(DomainError::Targets(TargetsError::Unmodifiable).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::DuplicateChannel("global".to_string());
        assert_eq!(err.to_string(), "A channel with the key 'global' already exists");

        let err = DomainError::Cancelled("join");
        assert_eq!(err.to_string(), "join was cancelled by an event handler");
    }
}
