//! Message targets - receivers of messages and ordered collections of them

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::value_objects::TargetId;

use super::{Channel, Chatter, Message};

/// Anything that can receive a message
pub trait MessageTarget: Send + Sync {
    /// Stable identity; two targets with equal ids are the same receiver
    fn target_id(&self) -> TargetId;

    /// Deliver a message as part of an ongoing send operation.
    ///
    /// Called after this target was marked in `delivery`. Nested fan-out must
    /// go through the same `delivery`.
    fn deliver(&self, message: &Message, delivery: &mut Delivery);

    /// Deliver a message as a send operation of its own
    fn send_message(&self, message: &Message) {
        let mut delivery = Delivery::new();
        if delivery.mark(self.target_id()) {
            self.deliver(message, &mut delivery);
        }
    }

    fn as_chatter(&self) -> Option<&Chatter> {
        None
    }

    fn as_channel(&self) -> Option<&Channel> {
        None
    }
}

/// Conversion into a shared target handle
pub trait IntoTarget {
    fn into_target(self) -> Arc<dyn MessageTarget>;
}

impl<T: MessageTarget + 'static> IntoTarget for Arc<T> {
    fn into_target(self) -> Arc<dyn MessageTarget> {
        self
    }
}

impl IntoTarget for Arc<dyn MessageTarget> {
    fn into_target(self) -> Arc<dyn MessageTarget> {
        self
    }
}

/// Targets reached by one send operation.
///
/// A target is delivered to at most once per delivery; this also stops
/// channels that forward to each other from looping.
#[derive(Debug, Default)]
pub struct Delivery {
    reached: HashSet<TargetId>,
}

impl Delivery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a target as reached; false if it already was
    pub fn mark(&mut self, id: TargetId) -> bool {
        self.reached.insert(id)
    }

    pub fn contains(&self, id: &TargetId) -> bool {
        self.reached.contains(id)
    }

    pub fn len(&self) -> usize {
        self.reached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reached.is_empty()
    }

    pub fn reached(&self) -> impl Iterator<Item = &TargetId> {
        self.reached.iter()
    }
}

/// Error raised when mutating a read-only [`Targets`] view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetsError {
    #[error("Targets view is unmodifiable")]
    Unmodifiable,
}

/// Insertion-ordered, duplicate-free collection of message targets.
///
/// A writable `Targets` owns its storage; [`unmodifiable`](Self::unmodifiable)
/// returns a read-only handle onto the same storage that keeps reflecting
/// later changes. Cloning a read-only handle shares storage, cloning a
/// writable one copies it.
pub struct Targets {
    entries: Arc<RwLock<Vec<Arc<dyn MessageTarget>>>>,
    read_only: bool,
}

impl Targets {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            read_only: false,
        }
    }

    /// Create a collection from targets, dropping duplicates
    pub fn of<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoTarget,
    {
        let collection = Self::new();
        for target in targets {
            collection.insert(target.into_target());
        }
        collection
    }

    /// Independent, writable copy of the current members
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            entries: Arc::new(RwLock::new(self.entries.read().clone())),
            read_only: false,
        }
    }

    /// Live read-only view of this collection
    #[must_use]
    pub fn unmodifiable(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            read_only: true,
        }
    }

    pub fn is_unmodifiable(&self) -> bool {
        self.read_only
    }

    /// Add a target; `Ok(false)` if a target with the same id is present
    pub fn add(&self, target: impl IntoTarget) -> Result<bool, TargetsError> {
        self.check_writable()?;
        Ok(self.insert(target.into_target()))
    }

    /// Remove a target by identity
    pub fn remove(&self, target: &dyn MessageTarget) -> Result<bool, TargetsError> {
        self.remove_id(&target.target_id())
    }

    pub fn remove_id(&self, id: &TargetId) -> Result<bool, TargetsError> {
        self.check_writable()?;
        Ok(self.delete(id))
    }

    pub fn clear(&self) -> Result<bool, TargetsError> {
        self.check_writable()?;
        let mut entries = self.entries.write();
        let changed = !entries.is_empty();
        entries.clear();
        Ok(changed)
    }

    fn check_writable(&self) -> Result<(), TargetsError> {
        if self.read_only {
            Err(TargetsError::Unmodifiable)
        } else {
            Ok(())
        }
    }

    /// Insert without the read-only check; for the owner of the storage
    pub(crate) fn insert(&self, target: Arc<dyn MessageTarget>) -> bool {
        let id = target.target_id();
        let mut entries = self.entries.write();
        if entries.iter().any(|existing| existing.target_id() == id) {
            return false;
        }
        entries.push(target);
        true
    }

    /// Remove without the read-only check; for the owner of the storage
    pub(crate) fn delete(&self, id: &TargetId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|existing| existing.target_id() != *id);
        entries.len() != before
    }

    pub fn contains(&self, target: &dyn MessageTarget) -> bool {
        self.contains_id(&target.target_id())
    }

    pub fn contains_id(&self, id: &TargetId) -> bool {
        self.entries
            .read()
            .iter()
            .any(|existing| existing.target_id() == *id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current members, in insertion order
    pub fn snapshot(&self) -> Vec<Arc<dyn MessageTarget>> {
        self.entries.read().clone()
    }

    pub fn ids(&self) -> Vec<TargetId> {
        self.entries
            .read()
            .iter()
            .map(|target| target.target_id())
            .collect()
    }

    /// Lazily filter the members present when called
    pub fn filter<P>(&self, predicate: P) -> impl Iterator<Item = Arc<dyn MessageTarget>>
    where
        P: Fn(&dyn MessageTarget) -> bool,
    {
        self.snapshot()
            .into_iter()
            .filter(move |target| predicate(target.as_ref()))
    }

    pub fn find(&self, id: &TargetId) -> Option<Arc<dyn MessageTarget>> {
        self.entries
            .read()
            .iter()
            .find(|target| target.target_id() == *id)
            .cloned()
    }

    /// Ids of the chatters in this collection
    pub fn chatter_ids(&self) -> Vec<Uuid> {
        self.entries
            .read()
            .iter()
            .filter_map(|target| target.target_id().chatter_id())
            .collect()
    }

    /// Deliver a message to every member as one send operation
    pub fn send_message(&self, message: &Message) {
        let mut delivery = Delivery::new();
        self.deliver(message, &mut delivery);
    }

    /// Deliver to every member not yet reached by `delivery`.
    ///
    /// Iterates a snapshot, so targets may leave or join while receiving.
    pub fn deliver(&self, message: &Message, delivery: &mut Delivery) {
        for target in self.snapshot() {
            if delivery.mark(target.target_id()) {
                target.deliver(message, delivery);
            }
        }
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Targets {
    fn clone(&self) -> Self {
        if self.read_only {
            self.unmodifiable()
        } else {
            self.copy()
        }
    }
}

impl fmt::Debug for Targets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Targets")
            .field("ids", &self.ids())
            .field("read_only", &self.read_only)
            .finish()
    }
}
