//! Auto-join - keeps chatters joined to every auto-join channel

use std::sync::Arc;

use tracing::debug;

use crate::entities::{Channel, Chatter};
use crate::error::DomainError;
use crate::events::{ChannelRegisteredEvent, ChatterRegisteredEvent, EventBus, EventSubscription};
use crate::traits::{ChannelRepository, ChatterRepository};

/// Owner name of the auto-join subscriptions
pub const AUTO_JOIN_OWNER: &str = "auto-join";

/// Joins chatters to channels with [`Channel::AUTO_JOIN`] set
pub struct AutoJoinChannels {
    channels: Arc<dyn ChannelRepository>,
    chatters: Arc<dyn ChatterRepository>,
}

impl AutoJoinChannels {
    pub fn new(channels: Arc<dyn ChannelRepository>, chatters: Arc<dyn ChatterRepository>) -> Self {
        Self { channels, chatters }
    }

    /// Subscribe to registrations on `event_bus`.
    ///
    /// The subscriptions own the service until they are closed or the bus
    /// unregisters [`AUTO_JOIN_OWNER`].
    pub fn bind(self: Arc<Self>, event_bus: &EventBus) -> Vec<EventSubscription> {
        let on_chatter = Arc::clone(&self);
        let on_channel = self;

        vec![
            event_bus.on_owned(AUTO_JOIN_OWNER, move |event: &mut ChatterRegisteredEvent| {
                on_chatter.join_auto_channels(&event.chatter);
                Ok(())
            }),
            event_bus.on_owned(AUTO_JOIN_OWNER, move |event: &mut ChannelRegisteredEvent| {
                on_channel.join_all_chatters(&event.channel);
                Ok(())
            }),
        ]
    }

    /// Join every auto-join channel; the first one joined becomes active if none is
    pub fn join_auto_channels(&self, chatter: &Chatter) {
        let mut channels = self.channels.filter(&|channel| channel.is(&Channel::AUTO_JOIN));
        channels.sort();

        for channel in channels {
            let result = if chatter.active_channel().is_none() {
                chatter.set_active_channel(Some(&channel))
            } else {
                chatter.join(&channel)
            };
            if let Err(error) = result {
                Self::skipped(chatter, &channel, &error);
            }
        }
    }

    /// Join every registered chatter to a newly registered auto-join channel
    pub fn join_all_chatters(&self, channel: &Arc<Channel>) {
        if !channel.is(&Channel::AUTO_JOIN) {
            return;
        }
        for chatter in self.chatters.all() {
            if let Err(error) = chatter.join(channel) {
                Self::skipped(&chatter, channel, &error);
            }
        }
    }

    fn skipped(chatter: &Chatter, channel: &Channel, error: &DomainError) {
        debug!(
            chatter = %chatter.id(),
            channel = %channel.key(),
            error = %error,
            "Auto-join skipped"
        );
    }
}
