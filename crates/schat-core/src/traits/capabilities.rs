//! Capabilities supplied from outside the core
//!
//! Permission checks and view rendering belong to the hosting platform; join
//! policies decide per channel whether a chatter may join.

use crate::entities::{Channel, Chatter, MessageTarget};
use crate::error::DomainError;

/// Answers whether a principal holds a permission
pub trait PermissionHandler: Send + Sync {
    fn has_permission(&self, permission: &str) -> bool;
}

impl<F> PermissionHandler for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn has_permission(&self, permission: &str) -> bool {
        self(permission)
    }
}

/// Denies every permission
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllPermissions;

impl PermissionHandler for DenyAllPermissions {
    fn has_permission(&self, _permission: &str) -> bool {
        false
    }
}

/// Renders a chatter's state; invoked after its state changed
pub trait ViewConnector: Send + Sync {
    fn update(&self, chatter: &Chatter);
}

impl<F> ViewConnector for F
where
    F: Fn(&Chatter) + Send + Sync,
{
    fn update(&self, chatter: &Chatter) {
        self(chatter);
    }
}

/// View connector that renders nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopView;

impl ViewConnector for NoopView {
    fn update(&self, _chatter: &Chatter) {}
}

/// Decides whether a chatter may join a channel
pub trait JoinPolicy: Send + Sync {
    fn check(&self, chatter: &Chatter, channel: &Channel) -> Result<(), DomainError>;
}

/// Protected channels require their join permission
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionJoinPolicy;

impl JoinPolicy for PermissionJoinPolicy {
    fn check(&self, chatter: &Chatter, channel: &Channel) -> Result<(), DomainError> {
        if !channel.is(&Channel::REQUIRES_JOIN_PERMISSION) {
            return Ok(());
        }

        let permission = channel.get(&Channel::JOIN_PERMISSION);
        if chatter.has_permission(&permission) {
            Ok(())
        } else {
            Err(DomainError::AccessDenied {
                channel: channel.key().to_string(),
                permission,
            })
        }
    }
}

/// Lets everyone join
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowJoinPolicy;

impl JoinPolicy for AllowJoinPolicy {
    fn check(&self, _chatter: &Chatter, _channel: &Channel) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Private channels admit only chatters already among their targets
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivateJoinPolicy;

impl JoinPolicy for PrivateJoinPolicy {
    fn check(&self, chatter: &Chatter, channel: &Channel) -> Result<(), DomainError> {
        if !channel.is(&Channel::PRIVATE) || channel.is_member(&chatter.target_id()) {
            return Ok(());
        }
        Err(DomainError::AccessDenied {
            channel: channel.key().to_string(),
            permission: channel.get(&Channel::JOIN_PERMISSION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Identity;
    use std::sync::Arc;

    fn vip() -> Arc<Channel> {
        Channel::builder("vip")
            .set(&Channel::REQUIRES_JOIN_PERMISSION, true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_unprotected_channel_allows_everyone() {
        let channel = Channel::builder("global").build().unwrap();
        let chatter = Chatter::builder(Identity::new("Notch")).build();

        assert!(PermissionJoinPolicy.check(&chatter, &channel).is_ok());
    }

    #[test]
    fn test_protected_channel_requires_permission() {
        let channel = vip();
        let denied = Chatter::builder(Identity::new("Notch")).build();
        let granted = Chatter::builder(Identity::new("Jeb"))
            .permission_handler(Arc::new(|permission: &str| permission == "schat.channel.vip.join"))
            .build();

        let err = PermissionJoinPolicy.check(&denied, &channel).unwrap_err();
        assert!(err.is_authorization());
        assert!(PermissionJoinPolicy.check(&granted, &channel).is_ok());
        assert!(AllowJoinPolicy.check(&denied, &channel).is_ok());
    }

    #[test]
    fn test_private_channel_admits_only_its_targets() {
        let channel = Channel::builder("private-a-b")
            .set(&Channel::PRIVATE, true)
            .build()
            .unwrap();
        let member = Chatter::builder(Identity::new("Notch")).build();
        let stranger = Chatter::builder(Identity::new("Eve")).build();
        channel.add_target(Arc::clone(&member));

        assert!(PrivateJoinPolicy.check(&member, &channel).is_ok());
        let err = PrivateJoinPolicy.check(&stranger, &channel).unwrap_err();
        assert!(err.is_authorization());

        let public = Channel::builder("global").build().unwrap();
        assert!(PrivateJoinPolicy.check(&stranger, &public).is_ok());
    }
}
