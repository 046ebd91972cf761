//! # schat-core
//!
//! Domain layer of the chat core: typed settings, the event bus, message
//! targets, channels, chatters and the send pipeline.
//! This crate has no dependency on a transport, a UI or a storage engine.

pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod settings;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Channel, ChannelBuilder, Chatter, ChatterBuilder, Delivery, Draft, IntoTarget, Message,
    MessageHistory, MessageTarget, MessageType, Targets, TargetsError,
};
pub use error::DomainError;
pub use events::{
    Cancellable, Event, EventBus, EventSubscription, HandlerResult, MessageEvent,
    SendChannelMessageEvent, SendMessageEvent,
};
pub use repositories::{InMemoryChannelRepository, InMemoryChatterRepository, TargetResolver};
pub use services::{AutoJoinChannels, ChannelInteractor, SendMessage};
pub use settings::{Setting, SettingValue, Settings};
pub use traits::{
    ChannelRepository, ChatterRepository, JoinPolicy, PermissionHandler, RepoResult,
    ViewConnector,
};
pub use value_objects::{Identity, TargetId};
