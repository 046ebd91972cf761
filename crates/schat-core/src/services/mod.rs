//! Domain services - use cases built on the entities and repositories

mod auto_join;
mod channel_interactor;
mod send_message;

pub use auto_join::{AutoJoinChannels, AUTO_JOIN_OWNER};
pub use channel_interactor::ChannelInteractor;
pub use send_message::{SendMessage, SendMessageBuilder};
