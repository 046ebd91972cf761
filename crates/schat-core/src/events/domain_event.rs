//! Domain events - posted while messages are routed and membership changes
//!
//! Cancellable events guard an operation; the caller that posted them checks
//! the flag once the post returns. The remaining events are notifications.

use std::sync::Arc;

use crate::entities::{Channel, Chatter, Message, Targets};

use super::event::{Cancellable, Event, MessageEvent};

// ============================================================================
// Message Events
// ============================================================================

/// Posted by the send pipeline before a message is delivered
#[derive(Debug)]
pub struct SendMessageEvent {
    message: Message,
    targets: Targets,
    cancelled: bool,
}

impl SendMessageEvent {
    /// Targets default to a writable copy of the message targets
    pub fn new(message: Message) -> Self {
        let targets = message.targets().copy();
        Self {
            message,
            targets,
            cancelled: false,
        }
    }

    pub fn into_parts(self) -> (Message, Targets) {
        (self.message, self.targets)
    }
}

/// Posted by a channel before it fans a message out to its members
#[derive(Debug)]
pub struct SendChannelMessageEvent {
    channel: Arc<Channel>,
    message: Message,
    targets: Targets,
    cancelled: bool,
}

impl SendChannelMessageEvent {
    /// Targets default to a writable copy of the channel members
    pub fn new(channel: Arc<Channel>, message: Message) -> Self {
        let targets = channel.targets().copy();
        Self {
            channel,
            message,
            targets,
            cancelled: false,
        }
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn into_parts(self) -> (Message, Targets) {
        (self.message, self.targets)
    }
}

macro_rules! message_event {
    ($event:ty) => {
        impl Cancellable for $event {
            fn is_cancelled(&self) -> bool {
                self.cancelled
            }

            fn set_cancelled(&mut self, cancelled: bool) {
                self.cancelled = cancelled;
            }
        }

        impl MessageEvent for $event {
            fn message(&self) -> &Message {
                &self.message
            }

            fn set_message(&mut self, message: Message) {
                self.message = message;
            }

            fn targets(&self) -> &Targets {
                &self.targets
            }

            fn set_targets(&mut self, targets: Targets) {
                self.targets = targets;
            }
        }

        impl Event for $event {
            fn as_cancellable_mut(&mut self) -> Option<&mut (dyn Cancellable + 'static)> {
                Some(self)
            }

            fn as_message_event_mut(&mut self) -> Option<&mut (dyn MessageEvent + 'static)> {
                Some(self)
            }
        }
    };
}

message_event!(SendMessageEvent);
message_event!(SendChannelMessageEvent);

// ============================================================================
// Membership Events
// ============================================================================

/// Posted before a chatter joins a channel through the interactor
#[derive(Debug)]
pub struct JoinChannelEvent {
    pub chatter: Arc<Chatter>,
    pub channel: Arc<Channel>,
    cancelled: bool,
}

impl JoinChannelEvent {
    pub fn new(chatter: Arc<Chatter>, channel: Arc<Channel>) -> Self {
        Self {
            chatter,
            channel,
            cancelled: false,
        }
    }
}

/// Posted before a chatter leaves a channel through the interactor
#[derive(Debug)]
pub struct LeaveChannelEvent {
    pub chatter: Arc<Chatter>,
    pub channel: Arc<Channel>,
    cancelled: bool,
}

impl LeaveChannelEvent {
    pub fn new(chatter: Arc<Chatter>, channel: Arc<Channel>) -> Self {
        Self {
            chatter,
            channel,
            cancelled: false,
        }
    }
}

macro_rules! cancellable_event {
    ($event:ty) => {
        impl Cancellable for $event {
            fn is_cancelled(&self) -> bool {
                self.cancelled
            }

            fn set_cancelled(&mut self, cancelled: bool) {
                self.cancelled = cancelled;
            }
        }

        impl Event for $event {
            fn as_cancellable_mut(&mut self) -> Option<&mut (dyn Cancellable + 'static)> {
                Some(self)
            }
        }
    };
}

cancellable_event!(JoinChannelEvent);
cancellable_event!(LeaveChannelEvent);

// ============================================================================
// Registry Events
// ============================================================================

#[derive(Debug, Clone)]
pub struct ChannelRegisteredEvent {
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct ChannelRemovedEvent {
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct ChatterRegisteredEvent {
    pub chatter: Arc<Chatter>,
}

#[derive(Debug, Clone)]
pub struct ChatterRemovedEvent {
    pub chatter: Arc<Chatter>,
}

impl Event for ChannelRegisteredEvent {}
impl Event for ChannelRemovedEvent {}
impl Event for ChatterRegisteredEvent {}
impl Event for ChatterRemovedEvent {}
