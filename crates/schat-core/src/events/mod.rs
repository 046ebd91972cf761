//! Typed event bus and the events posted by the core

mod bus;
mod domain_event;
mod event;
mod subscription;

pub use bus::EventBus;
pub use domain_event::{
    ChannelRegisteredEvent, ChannelRemovedEvent, ChatterRegisteredEvent, ChatterRemovedEvent,
    JoinChannelEvent, LeaveChannelEvent, SendChannelMessageEvent, SendMessageEvent,
};
pub use event::{AsAny, Cancellable, Event, EventType, HandlerResult, MessageEvent};
pub use subscription::EventSubscription;
