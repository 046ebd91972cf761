//! Chat runtime - wires a configured chat core together
//!
//! Builds the event bus and repositories, registers the configured channels,
//! binds the auto-join service and exposes the use cases.

use std::sync::Arc;

use schat_core::entities::{Channel, ChannelBuilder, Chatter, ChatterBuilder};
use schat_core::events::{EventBus, EventSubscription};
use schat_core::repositories::{
    InMemoryChannelRepository, InMemoryChatterRepository, TargetResolver,
};
use schat_core::services::{AutoJoinChannels, ChannelInteractor, SendMessage};
use schat_core::traits::{ChannelRepository, ChatterRepository, PermissionHandler};
use schat_core::value_objects::Identity;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::config::{ChannelConfig, ChatConfig, ConfigError};
use crate::error::AppResult;

/// A running chat core
pub struct ChatRuntime {
    config: ChatConfig,
    event_bus: EventBus,
    channels: Arc<InMemoryChannelRepository>,
    chatters: Arc<InMemoryChatterRepository>,
    send_message: SendMessage,
    interactor: ChannelInteractor,
    resolver: TargetResolver,
    auto_join: Vec<EventSubscription>,
}

impl ChatRuntime {
    /// Build a runtime from configuration
    #[instrument(skip(config), fields(env = ?config.env, channels = config.channels.len()))]
    pub fn from_config(config: &ChatConfig) -> AppResult<Self> {
        config.check()?;

        let event_bus = if config.debug_events {
            EventBus::with_logging()
        } else {
            EventBus::new()
        };
        let channels = InMemoryChannelRepository::new_shared(event_bus.clone());
        let chatters = InMemoryChatterRepository::new_shared(event_bus.clone());

        let auto_join = Arc::new(AutoJoinChannels::new(channels.clone(), chatters.clone()))
            .bind(&event_bus);

        let send_message = SendMessage::builder()
            .event_bus(event_bus.clone())
            .channels(channels.clone())
            .chatters(chatters.clone())
            .build();
        let interactor =
            ChannelInteractor::new(event_bus.clone(), channels.clone(), chatters.clone());
        let resolver = TargetResolver::new(channels.clone(), chatters.clone());

        let runtime = Self {
            config: config.clone(),
            event_bus,
            channels,
            chatters,
            send_message,
            interactor,
            resolver,
            auto_join,
        };

        for channel in &config.channels {
            runtime.create_channel(channel)?;
        }

        info!(channels = runtime.channels.len(), "Chat runtime ready");
        Ok(runtime)
    }

    /// Build a runtime from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_config(&ChatConfig::from_env()?)
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Channel builder wired to the runtime's event bus
    pub fn channel_builder(&self, key: impl Into<String>) -> ChannelBuilder {
        self.channels.builder(key)
    }

    /// Build and register a configured channel
    pub fn create_channel(&self, config: &ChannelConfig) -> AppResult<Arc<Channel>> {
        config.validate().map_err(ConfigError::from)?;

        let mut builder = self
            .channel_builder(config.key.as_str())
            .set(&Channel::PRIORITY, config.priority)
            .set(&Channel::REQUIRES_JOIN_PERMISSION, config.protected)
            .set(&Channel::AUTO_JOIN, config.auto_join)
            .set(&Channel::FORCED, config.forced)
            .set(&Channel::HIDDEN, config.hidden)
            .set(&Channel::GLOBAL, config.global);
        if let Some(name) = &config.display_name {
            builder = builder.display_name(name.as_str());
        }
        if let Some(permission) = &config.join_permission {
            builder = builder.set(&Channel::JOIN_PERMISSION, permission.clone());
        }

        let channel = builder.build()?;
        self.channels.add(Arc::clone(&channel))?;
        Ok(channel)
    }

    // ========================================================================
    // Chatters
    // ========================================================================

    /// Chatter builder using the configured history size
    pub fn chatter_builder(&self, identity: Identity) -> ChatterBuilder {
        Chatter::builder(identity).history_size(self.config.message_history)
    }

    /// Create and register a chatter
    pub fn create_chatter(
        &self,
        identity: Identity,
        permissions: Arc<dyn PermissionHandler>,
    ) -> AppResult<Arc<Chatter>> {
        let chatter = self
            .chatter_builder(identity)
            .permission_handler(permissions)
            .build();
        self.register_chatter(chatter)
    }

    /// Register a chatter; it joins the auto-join channels and, when it has
    /// no active channel yet, the default channel
    #[instrument(skip(self, chatter), fields(chatter = %chatter.id()))]
    pub fn register_chatter(&self, chatter: Arc<Chatter>) -> AppResult<Arc<Chatter>> {
        self.chatters.add(Arc::clone(&chatter))?;

        if chatter.active_channel().is_none() {
            if let Some(key) = &self.config.default_channel {
                if let Err(error) = self.interactor.set_active_channel(chatter.id(), key) {
                    debug!(error = %error, "Default channel not joined");
                }
            }
        }
        Ok(chatter)
    }

    /// Unregister a chatter, leaving all of its channels
    pub fn remove_chatter(&self, id: Uuid) -> Option<Arc<Chatter>> {
        self.chatters.remove(id)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn channels(&self) -> &Arc<InMemoryChannelRepository> {
        &self.channels
    }

    pub fn chatters(&self) -> &Arc<InMemoryChatterRepository> {
        &self.chatters
    }

    pub fn send_message(&self) -> &SendMessage {
        &self.send_message
    }

    pub fn interactor(&self) -> &ChannelInteractor {
        &self.interactor
    }

    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }
}

// The auto-join handlers hold the repositories, which hold the bus
impl Drop for ChatRuntime {
    fn drop(&mut self) {
        for subscription in &self.auto_join {
            subscription.close();
        }
    }
}
