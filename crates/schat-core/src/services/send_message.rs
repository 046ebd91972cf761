//! Send message use case - the message dispatch pipeline
//!
//! Posts a cancellable [`SendMessageEvent`] and, unless cancelled, delivers
//! the possibly rewritten message to the possibly rewritten targets. A
//! message addressed to a single chatter by another chatter is routed through
//! the private channel of the two.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::entities::{Channel, Chatter, Delivery, Draft, Message, MessageTarget, Targets};
use crate::error::DomainError;
use crate::events::{Cancellable, EventBus, SendMessageEvent};
use crate::repositories::{InMemoryChannelRepository, InMemoryChatterRepository};
use crate::traits::{ChannelRepository, ChatterRepository, PrivateJoinPolicy, RepoResult};

const PRIVATE_CHANNEL_PREFIX: &str = "private-";

/// Message dispatch pipeline
#[derive(Clone)]
pub struct SendMessage {
    event_bus: EventBus,
    channels: Arc<dyn ChannelRepository>,
    chatters: Arc<dyn ChatterRepository>,
}

impl SendMessage {
    pub fn builder() -> SendMessageBuilder {
        SendMessageBuilder::default()
    }

    /// Key of the private channel between two chatters; symmetric
    pub fn private_channel_key(a: &Chatter, b: &Chatter) -> String {
        let (first, second) = if a.id() <= b.id() {
            (a.id(), b.id())
        } else {
            (b.id(), a.id())
        };
        format!("{PRIVATE_CHANNEL_PREFIX}{first}-{second}")
    }

    /// Send a message.
    ///
    /// The message is returned even when a handler cancelled its delivery.
    #[instrument(skip(self, message), fields(message = %message.id()))]
    pub fn send(&self, message: Message) -> Message {
        let event = self.event_bus.post(SendMessageEvent::new(message));
        if event.is_cancelled() {
            debug!("Message cancelled");
            let (message, _) = event.into_parts();
            return message;
        }

        let (message, targets) = event.into_parts();
        let mut delivery = Delivery::new();

        match self.private_route(&message, &targets) {
            Some(channel) => {
                if delivery.mark(channel.target_id()) {
                    channel.deliver(&message, &mut delivery);
                }
            }
            None => targets.deliver(&message, &mut delivery),
        }

        debug!(reached = delivery.len(), "Message sent");
        message
    }

    /// Build and send a draft
    pub fn send_draft(&self, draft: Draft) -> Message {
        self.send(draft.build())
    }

    /// Send text from a chatter to its active channel
    pub fn chat(
        &self,
        chatter: &Chatter,
        text: impl Into<String>,
    ) -> Result<Message, DomainError> {
        let channel = chatter.active_channel().ok_or(DomainError::NoActiveChannel)?;
        Ok(self.send(chatter.message(text).to(channel).build()))
    }

    /// Send text from one chatter to another
    pub fn send_private(
        &self,
        from: &Chatter,
        to: &Arc<Chatter>,
        text: impl Into<String>,
    ) -> Message {
        self.send(from.message(text).to(Arc::clone(to)).build())
    }

    /// The private channel to use when the only target is a chatter other than the source
    fn private_route(&self, message: &Message, targets: &Targets) -> Option<Arc<Channel>> {
        let only = match targets.snapshot().as_slice() {
            [only] => Arc::clone(only),
            _ => return None,
        };
        let target_id = only.target_id().chatter_id()?;
        let source_id = message.source().id();
        if message.source().is_nil() || source_id == target_id {
            return None;
        }

        let source = self.chatters.find(source_id)?;
        let target = self.chatters.find(target_id)?;

        match self.private_channel(&source, &target) {
            Ok(channel) => Some(channel),
            Err(error) => {
                warn!(error = %error, "Private channel unavailable, delivering directly");
                None
            }
        }
    }

    /// Find or create the private channel of two chatters and make sure both joined it.
    ///
    /// Only the two chatters are admitted; they are added as targets before joining.
    pub fn private_channel(&self, a: &Chatter, b: &Chatter) -> RepoResult<Arc<Channel>> {
        let key = Self::private_channel_key(a, b);
        let display_name = format!("{}, {}", a.name(), b.name());
        let event_bus = self.event_bus.clone();

        let channel = self.channels.find_or_create(&key, &|key: &str| {
            Channel::builder(key)
                .display_name(display_name.clone())
                .set(&Channel::PRIVATE, true)
                .set(&Channel::GLOBAL, true)
                .set(&Channel::HIDDEN, true)
                .join_policy(Arc::new(PrivateJoinPolicy))
                .event_bus(event_bus.clone())
                .build()
        })?;

        for chatter in [a, b] {
            if let Some(handle) = chatter.handle() {
                channel.add_target(handle);
            }
            chatter.join(&channel)?;
        }
        Ok(channel)
    }
}

/// Builder for [`SendMessage`]
#[derive(Default)]
pub struct SendMessageBuilder {
    event_bus: Option<EventBus>,
    channels: Option<Arc<dyn ChannelRepository>>,
    chatters: Option<Arc<dyn ChatterRepository>>,
}

impl SendMessageBuilder {
    #[must_use]
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    #[must_use]
    pub fn channels(mut self, channels: Arc<dyn ChannelRepository>) -> Self {
        self.channels = Some(channels);
        self
    }

    #[must_use]
    pub fn chatters(mut self, chatters: Arc<dyn ChatterRepository>) -> Self {
        self.chatters = Some(chatters);
        self
    }

    /// Build the pipeline; missing repositories are created empty on the same bus
    pub fn build(self) -> SendMessage {
        let event_bus = self.event_bus.unwrap_or_else(EventBus::empty);
        let channels: Arc<dyn ChannelRepository> = match self.channels {
            Some(channels) => channels,
            None => InMemoryChannelRepository::new_shared(event_bus.clone()),
        };
        let chatters: Arc<dyn ChatterRepository> = match self.chatters {
            Some(chatters) => chatters,
            None => InMemoryChatterRepository::new_shared(event_bus.clone()),
        };

        SendMessage {
            event_bus,
            channels,
            chatters,
        }
    }
}
