//! In-memory repositories and target resolution

mod channel;
mod chatter;
mod resolver;

pub use channel::InMemoryChannelRepository;
pub use chatter::InMemoryChatterRepository;
pub use resolver::TargetResolver;
