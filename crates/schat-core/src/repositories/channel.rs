//! In-memory channel repository

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::entities::{Channel, ChannelBuilder};
use crate::error::DomainError;
use crate::events::{ChannelRegisteredEvent, ChannelRemovedEvent, EventBus};
use crate::traits::{ChannelRepository, RepoResult};
use crate::value_objects::TargetId;

/// Channels keyed by normalized key
///
/// Map guards are never held while calling into channels, chatters or the bus.
pub struct InMemoryChannelRepository {
    channels: DashMap<String, Arc<Channel>>,
    event_bus: EventBus,
}

impl InMemoryChannelRepository {
    #[must_use]
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            channels: DashMap::new(),
            event_bus,
        }
    }

    /// Create a new repository wrapped in Arc
    #[must_use]
    pub fn new_shared(event_bus: EventBus) -> Arc<Self> {
        Arc::new(Self::new(event_bus))
    }

    /// Channel builder wired to this repository's event bus
    pub fn builder(&self, key: impl Into<String>) -> ChannelBuilder {
        Channel::builder(key).event_bus(self.event_bus.clone())
    }

    /// Insert unless taken; returns the registered channel and whether it is new
    fn insert(&self, channel: Arc<Channel>) -> (Arc<Channel>, bool) {
        match self.channels.entry(channel.key().to_string()) {
            Entry::Occupied(existing) => (Arc::clone(existing.get()), false),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&channel));
                (channel, true)
            }
        }
    }

    fn registered(&self, channel: &Arc<Channel>) {
        tracing::info!(channel = %channel.key(), "Channel registered");
        self.event_bus.post(ChannelRegisteredEvent {
            channel: Arc::clone(channel),
        });
    }
}

impl ChannelRepository for InMemoryChannelRepository {
    fn all(&self) -> Vec<Arc<Channel>> {
        self.channels.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    fn keys(&self) -> Vec<String> {
        self.channels.iter().map(|entry| entry.key().clone()).collect()
    }

    fn find(&self, key: &str) -> Option<Arc<Channel>> {
        let key = Channel::normalize_key(key).ok()?;
        self.channels.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    fn add(&self, channel: Arc<Channel>) -> RepoResult<()> {
        let (channel, inserted) = self.insert(channel);
        if !inserted {
            return Err(DomainError::DuplicateChannel(channel.key().to_string()));
        }
        self.registered(&channel);
        Ok(())
    }

    fn find_or_create(
        &self,
        key: &str,
        create: &dyn Fn(&str) -> RepoResult<Arc<Channel>>,
    ) -> RepoResult<Arc<Channel>> {
        let key = Channel::normalize_key(key)?;
        if let Some(existing) = self.find(&key) {
            return Ok(existing);
        }

        let (channel, inserted) = self.insert(create(&key)?);
        if inserted {
            self.registered(&channel);
        }
        Ok(channel)
    }

    fn remove(&self, key: &str) -> Option<Arc<Channel>> {
        let key = Channel::normalize_key(key).ok()?;
        let (_, channel) = self.channels.remove(&key)?;

        for member in channel.targets().snapshot() {
            if let Some(chatter) = member.as_chatter() {
                chatter.leave(&channel);
            }
        }

        let id = TargetId::Channel(key);
        for other in self.all() {
            other.remove_target_id(&id);
        }

        tracing::info!(channel = %channel.key(), "Channel removed");
        self.event_bus.post(ChannelRemovedEvent {
            channel: Arc::clone(&channel),
        });
        Some(channel)
    }

    fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Chatter, MessageTarget};
    use crate::value_objects::Identity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_add_and_find_normalizes_key() {
        let repository = InMemoryChannelRepository::new(EventBus::new());
        repository.add(Channel::builder("global").build().unwrap()).unwrap();

        assert!(repository.contains("GLOBAL"));
        assert!(repository.find(" global ").is_some());
        assert!(repository.find("invalid key").is_none());
        assert_eq!(repository.keys(), vec!["global".to_string()]);
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let repository = InMemoryChannelRepository::new(EventBus::new());
        repository.add(Channel::builder("global").build().unwrap()).unwrap();

        let err = repository
            .add(Channel::builder("Global").build().unwrap())
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let repository = InMemoryChannelRepository::new(EventBus::empty());
        assert!(repository.get("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_find_or_create_registers_once() {
        let bus = EventBus::new();
        let registered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&registered);
        bus.on(move |_: &mut ChannelRegisteredEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let repository = InMemoryChannelRepository::new(bus);

        let create = |key: &str| repository.builder(key).build();
        let first = repository.find_or_create("Private", &create).unwrap();
        let second = repository.find_or_create("private", &create).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_cascades_to_members() {
        let repository = InMemoryChannelRepository::new(EventBus::new());
        let global = Channel::builder("global").build().unwrap();
        let forwarder = Channel::builder("forwarder").build().unwrap();
        forwarder.add_target(Arc::clone(&global));
        repository.add(Arc::clone(&global)).unwrap();
        repository.add(Arc::clone(&forwarder)).unwrap();

        let chatter = Chatter::builder(Identity::new("Notch")).build();
        chatter.set_active_channel(Some(&global)).unwrap();

        let removed = repository.remove("global").unwrap();

        assert!(Arc::ptr_eq(&removed, &global));
        assert!(!chatter.is_joined(&global));
        assert!(chatter.active_channel().is_none());
        assert!(global.targets().is_empty());
        assert!(!forwarder.is_member(&global.target_id()));
        assert!(repository.remove("global").is_none());
    }
}
