//! In-memory chatter repository

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::entities::Chatter;
use crate::events::{ChatterRegisteredEvent, ChatterRemovedEvent, EventBus};
use crate::traits::{ChatterRepository, RepoResult};

/// Chatters keyed by identity id
pub struct InMemoryChatterRepository {
    chatters: DashMap<Uuid, Arc<Chatter>>,
    event_bus: EventBus,
}

impl InMemoryChatterRepository {
    #[must_use]
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            chatters: DashMap::new(),
            event_bus,
        }
    }

    /// Create a new repository wrapped in Arc
    #[must_use]
    pub fn new_shared(event_bus: EventBus) -> Arc<Self> {
        Arc::new(Self::new(event_bus))
    }
}

impl ChatterRepository for InMemoryChatterRepository {
    fn all(&self) -> Vec<Arc<Chatter>> {
        self.chatters.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    fn ids(&self) -> Vec<Uuid> {
        self.chatters.iter().map(|entry| *entry.key()).collect()
    }

    fn find(&self, id: Uuid) -> Option<Arc<Chatter>> {
        self.chatters.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn add(&self, chatter: Arc<Chatter>) -> RepoResult<()> {
        if chatter.is_empty() {
            return Ok(());
        }

        let inserted = match self.chatters.entry(chatter.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&chatter));
                true
            }
        };

        if inserted {
            tracing::debug!(chatter = %chatter.id(), name = %chatter.name(), "Chatter registered");
            self.event_bus.post(ChatterRegisteredEvent { chatter });
        }
        Ok(())
    }

    fn remove(&self, id: Uuid) -> Option<Arc<Chatter>> {
        let (_, chatter) = self.chatters.remove(&id)?;
        chatter.leave_all();

        tracing::debug!(chatter = %id, "Chatter removed");
        self.event_bus.post(ChatterRemovedEvent {
            chatter: Arc::clone(&chatter),
        });
        Some(chatter)
    }

    fn len(&self) -> usize {
        self.chatters.len()
    }
}
