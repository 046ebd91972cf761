//! Target resolver - turns stable target ids back into targets

use std::sync::Arc;

use dashmap::DashMap;

use crate::entities::MessageTarget;
use crate::error::DomainError;
use crate::traits::{ChannelRepository, ChatterRepository, RepoResult};
use crate::value_objects::TargetId;

/// Resolves [`TargetId`]s through the repositories.
///
/// Console and custom targets are not owned by a repository and must be
/// registered with the resolver.
pub struct TargetResolver {
    channels: Arc<dyn ChannelRepository>,
    chatters: Arc<dyn ChatterRepository>,
    extra: DashMap<TargetId, Arc<dyn MessageTarget>>,
}

impl TargetResolver {
    pub fn new(channels: Arc<dyn ChannelRepository>, chatters: Arc<dyn ChatterRepository>) -> Self {
        Self {
            channels,
            chatters,
            extra: DashMap::new(),
        }
    }

    /// Make a console or custom target resolvable
    pub fn register(&self, target: Arc<dyn MessageTarget>) {
        self.extra.insert(target.target_id(), target);
    }

    pub fn unregister(&self, id: &TargetId) -> bool {
        self.extra.remove(id).is_some()
    }

    pub fn find(&self, id: &TargetId) -> Option<Arc<dyn MessageTarget>> {
        match id {
            TargetId::Chatter(uuid) => self
                .chatters
                .find(*uuid)
                .map(|chatter| chatter as Arc<dyn MessageTarget>),
            TargetId::Channel(key) => self
                .channels
                .find(key)
                .map(|channel| channel as Arc<dyn MessageTarget>),
            TargetId::Console | TargetId::Custom(_) => {
                self.extra.get(id).map(|entry| Arc::clone(entry.value()))
            }
        }
    }

    pub fn resolve(&self, id: &TargetId) -> RepoResult<Arc<dyn MessageTarget>> {
        self.find(id).ok_or_else(|| match id {
            TargetId::Chatter(uuid) => DomainError::ChatterNotFound(*uuid),
            TargetId::Channel(key) => DomainError::ChannelNotFound(key.clone()),
            TargetId::Console | TargetId::Custom(_) => DomainError::InvalidTargetId(id.to_string()),
        })
    }

    /// Resolve the tagged string form, e.g. `channel:global`
    pub fn resolve_str(&self, raw: &str) -> RepoResult<Arc<dyn MessageTarget>> {
        self.resolve(&raw.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Channel, Chatter};
    use crate::events::EventBus;
    use crate::repositories::{InMemoryChannelRepository, InMemoryChatterRepository};
    use crate::value_objects::Identity;

    fn resolver() -> (TargetResolver, Arc<InMemoryChannelRepository>, Arc<InMemoryChatterRepository>) {
        let channels = InMemoryChannelRepository::new_shared(EventBus::empty());
        let chatters = InMemoryChatterRepository::new_shared(EventBus::empty());
        let resolver = TargetResolver::new(channels.clone(), chatters.clone());
        (resolver, channels, chatters)
    }

    #[test]
    fn test_resolves_channels_and_chatters() {
        let (resolver, channels, chatters) = resolver();
        channels.add(Channel::builder("global").build().unwrap()).unwrap();
        let chatter = Chatter::builder(Identity::new("Notch")).build();
        chatters.add(Arc::clone(&chatter)).unwrap();

        let channel = resolver.resolve_str("channel:global").unwrap();
        assert_eq!(channel.target_id(), TargetId::Channel("global".into()));

        let found = resolver.resolve(&chatter.target_id()).unwrap();
        assert_eq!(found.as_chatter().map(Chatter::id), Some(chatter.id()));
    }

    #[test]
    fn test_unknown_targets() {
        let (resolver, _, _) = resolver();

        assert!(matches!(resolver.resolve_str("channel:missing"), Err(e) if e.is_not_found()));
        assert!(resolver
            .resolve_str("garbage")
            .err()
            .is_some_and(|e| e.is_validation()));
        assert!(resolver.resolve(&TargetId::Console).is_err());
    }
}
