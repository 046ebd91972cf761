//! Repository traits (ports) - registries owning the canonical entities
//!
//! Channels and chatters reference each other; a repository owns the
//! canonical instances, and removing one from it cascades to every member so
//! no dangling reference survives.

use std::sync::Arc;

use uuid::Uuid;

use crate::entities::{Channel, Chatter};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Channel Repository
// ============================================================================

pub trait ChannelRepository: Send + Sync {
    /// All registered channels
    fn all(&self) -> Vec<Arc<Channel>>;

    /// Keys of all registered channels
    fn keys(&self) -> Vec<String>;

    /// Check if a channel is registered under the (normalized) key
    fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Find a channel by key; the key is normalized first
    fn find(&self, key: &str) -> Option<Arc<Channel>>;

    /// Get a channel by key
    fn get(&self, key: &str) -> RepoResult<Arc<Channel>> {
        self.find(key)
            .ok_or_else(|| DomainError::ChannelNotFound(key.to_string()))
    }

    /// Channels matching a predicate
    fn filter(&self, predicate: &dyn Fn(&Channel) -> bool) -> Vec<Arc<Channel>> {
        self.all()
            .into_iter()
            .filter(|channel| predicate(channel))
            .collect()
    }

    /// Register a channel; fails if the key is taken
    fn add(&self, channel: Arc<Channel>) -> RepoResult<()>;

    /// Get the channel registered under `key`, creating and registering it if absent
    fn find_or_create(
        &self,
        key: &str,
        create: &dyn Fn(&str) -> RepoResult<Arc<Channel>>,
    ) -> RepoResult<Arc<Channel>>;

    /// Unregister a channel; every member leaves it
    fn remove(&self, key: &str) -> Option<Arc<Channel>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Chatter Repository
// ============================================================================

pub trait ChatterRepository: Send + Sync {
    /// All registered chatters
    fn all(&self) -> Vec<Arc<Chatter>>;

    fn ids(&self) -> Vec<Uuid>;

    fn contains(&self, id: Uuid) -> bool {
        self.find(id).is_some()
    }

    fn find(&self, id: Uuid) -> Option<Arc<Chatter>>;

    /// Get a chatter by id
    fn get(&self, id: Uuid) -> RepoResult<Arc<Chatter>> {
        self.find(id).ok_or(DomainError::ChatterNotFound(id))
    }

    /// Chatters matching a predicate
    fn filter(&self, predicate: &dyn Fn(&Chatter) -> bool) -> Vec<Arc<Chatter>> {
        self.all()
            .into_iter()
            .filter(|chatter| predicate(chatter))
            .collect()
    }

    /// Register a chatter; registering an id twice keeps the first chatter
    fn add(&self, chatter: Arc<Chatter>) -> RepoResult<()>;

    /// Unregister a chatter; it leaves every channel
    fn remove(&self, id: Uuid) -> Option<Arc<Chatter>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
