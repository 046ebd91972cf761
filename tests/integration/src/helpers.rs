//! Test helpers for integration tests
//!
//! Builds runtimes from compact channel lists and registers chatters.

use std::sync::Arc;

use anyhow::Result;
use schat_common::{ChannelConfig, ChatConfig, ChatRuntime};
use schat_core::entities::Chatter;
use schat_core::traits::{DenyAllPermissions, PermissionHandler};
use schat_core::value_objects::Identity;

use crate::fixtures::GrantablePermissions;

/// Configuration with the given `key[:flags]` channel list and no default channel
pub fn test_config(channels: &[&str]) -> Result<ChatConfig> {
    Ok(ChatConfig {
        channels: channels
            .iter()
            .map(|entry| ChannelConfig::parse(entry))
            .collect::<Result<_, _>>()?,
        default_channel: None,
        ..ChatConfig::default()
    })
}

/// Start a runtime with the given channel list
pub fn runtime(channels: &[&str]) -> Result<ChatRuntime> {
    Ok(ChatRuntime::from_config(&test_config(channels)?)?)
}

/// Register a chatter without any permission
pub fn chatter(runtime: &ChatRuntime, name: &str) -> Result<Arc<Chatter>> {
    chatter_with(runtime, name, Arc::new(DenyAllPermissions))
}

/// Register a chatter whose permissions can be granted later
pub fn grantable_chatter(
    runtime: &ChatRuntime,
    name: &str,
) -> Result<(Arc<Chatter>, Arc<GrantablePermissions>)> {
    let permissions = GrantablePermissions::new();
    let chatter = chatter_with(runtime, name, permissions.clone())?;
    Ok((chatter, permissions))
}

pub fn chatter_with(
    runtime: &ChatRuntime,
    name: &str,
    permissions: Arc<dyn PermissionHandler>,
) -> Result<Arc<Chatter>> {
    Ok(runtime.create_chatter(Identity::new(name), permissions)?)
}
