//! Channel interactor - membership changes requested by id
//!
//! Resolves chatters and channels through the repositories, posts the
//! cancellable join/leave events and applies the channel policies.

use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::entities::Channel;
use crate::error::DomainError;
use crate::events::{Cancellable, EventBus, JoinChannelEvent, LeaveChannelEvent};
use crate::traits::{ChannelRepository, ChatterRepository, RepoResult};

/// Channel membership use cases
#[derive(Clone)]
pub struct ChannelInteractor {
    event_bus: EventBus,
    channels: Arc<dyn ChannelRepository>,
    chatters: Arc<dyn ChatterRepository>,
}

impl ChannelInteractor {
    pub fn new(
        event_bus: EventBus,
        channels: Arc<dyn ChannelRepository>,
        chatters: Arc<dyn ChatterRepository>,
    ) -> Self {
        Self {
            event_bus,
            channels,
            chatters,
        }
    }

    /// Join a channel; an existing membership is checked against the join policy again
    #[instrument(skip(self))]
    pub fn join_channel(&self, chatter_id: Uuid, key: &str) -> RepoResult<Arc<Channel>> {
        let chatter = self.chatters.get(chatter_id)?;
        let channel = self.channels.get(key)?;

        if chatter.is_joined(&channel) {
            if let Err(error) = channel.join_policy().check(&chatter, &channel) {
                chatter.leave(&channel);
                debug!(error = %error, "Membership revoked");
                return Err(error);
            }
            return Ok(channel);
        }

        let event = self
            .event_bus
            .post(JoinChannelEvent::new(Arc::clone(&chatter), Arc::clone(&channel)));
        if event.is_cancelled() {
            return Err(DomainError::Cancelled("join"));
        }

        if let Err(error) = chatter.join(&channel) {
            chatter.leave(&channel);
            debug!(error = %error, "Join rejected");
            return Err(error);
        }
        Ok(channel)
    }

    /// Leave a channel; forced channels cannot be left
    #[instrument(skip(self))]
    pub fn leave_channel(&self, chatter_id: Uuid, key: &str) -> RepoResult<()> {
        let chatter = self.chatters.get(chatter_id)?;
        let channel = self.channels.get(key)?;

        if channel.is(&Channel::FORCED) {
            return Err(DomainError::CannotLeaveForcedChannel(channel.key().to_string()));
        }
        if !chatter.is_joined(&channel) {
            return Ok(());
        }

        let event = self
            .event_bus
            .post(LeaveChannelEvent::new(Arc::clone(&chatter), Arc::clone(&channel)));
        if event.is_cancelled() {
            return Err(DomainError::Cancelled("leave"));
        }

        chatter.leave(&channel);
        Ok(())
    }

    /// Make a channel the chatter's active channel, joining it first
    #[instrument(skip(self))]
    pub fn set_active_channel(&self, chatter_id: Uuid, key: &str) -> RepoResult<Arc<Channel>> {
        let channel = self.join_channel(chatter_id, key)?;
        let chatter = self.chatters.get(chatter_id)?;
        chatter.set_active_channel(Some(&channel))?;
        Ok(channel)
    }
}
