//! Domain entities - core business objects

mod channel;
mod chatter;
mod history;
mod message;
mod target;

pub use channel::{Channel, ChannelBuilder};
pub use chatter::{Chatter, ChatterBuilder};
pub use history::MessageHistory;
pub use message::{Draft, Message, MessageType};
pub use target::{Delivery, IntoTarget, MessageTarget, Targets, TargetsError};
