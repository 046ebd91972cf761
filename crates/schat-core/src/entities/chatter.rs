//! Chatter entity - a connected user's chat state

use std::fmt;
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::DomainError;
use crate::traits::{DenyAllPermissions, NoopView, PermissionHandler, ViewConnector};
use crate::value_objects::{Identity, TargetId};

use super::message::Draft;
use super::target::{Delivery, MessageTarget};
use super::{Channel, Message, MessageHistory};

static EMPTY: LazyLock<Arc<Chatter>> = LazyLock::new(|| {
    Arc::new(Chatter {
        identity: Identity::nil(),
        me: Weak::new(),
        state: RwLock::new(ChatterState::new(1)),
        permissions: Arc::new(DenyAllPermissions),
        view: Arc::new(NoopView),
        empty: true,
    })
});

struct ChatterState {
    channels: Vec<Arc<Channel>>,
    active_channel: Option<Arc<Channel>>,
    messages: MessageHistory,
}

impl ChatterState {
    fn new(history_size: usize) -> Self {
        Self {
            channels: Vec::new(),
            active_channel: None,
            messages: MessageHistory::with_capacity(history_size),
        }
    }

    fn position(&self, channel: &Channel) -> Option<usize> {
        self.channels.iter().position(|joined| joined.key() == channel.key())
    }
}

/// Chatter entity
///
/// Invariants:
/// - the active channel, if any, is one of the joined channels
/// - every joined channel is joined at most once
/// - membership is kept in both directions: a joined channel lists the
///   chatter as a target
pub struct Chatter {
    identity: Identity,
    me: Weak<Chatter>,
    state: RwLock<ChatterState>,
    permissions: Arc<dyn PermissionHandler>,
    view: Arc<dyn ViewConnector>,
    empty: bool,
}

impl Chatter {
    /// Start building a chatter
    pub fn builder(identity: Identity) -> ChatterBuilder {
        ChatterBuilder::new(identity)
    }

    /// The null chatter: never joins, never receives
    pub fn empty() -> Arc<Chatter> {
        Arc::clone(&EMPTY)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    #[inline]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.identity.id()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Shared handle to this chatter
    pub fn handle(&self) -> Option<Arc<Chatter>> {
        self.me.upgrade()
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Joined channels, in channel order
    pub fn channels(&self) -> Vec<Arc<Channel>> {
        let mut channels = self.state.read().channels.clone();
        channels.sort();
        channels
    }

    /// A joined channel by key
    pub fn channel(&self, key: &str) -> Option<Arc<Channel>> {
        let key = Channel::normalize_key(key).ok()?;
        self.state
            .read()
            .channels
            .iter()
            .find(|channel| channel.key() == key)
            .cloned()
    }

    pub fn active_channel(&self) -> Option<Arc<Channel>> {
        self.state.read().active_channel.clone()
    }

    pub fn is_joined(&self, channel: &Channel) -> bool {
        self.state.read().position(channel).is_some()
    }

    pub fn is_active_channel(&self, channel: &Channel) -> bool {
        self.state
            .read()
            .active_channel
            .as_ref()
            .is_some_and(|active| active.key() == channel.key())
    }

    /// Join a channel if its join policy allows it.
    ///
    /// Joining an already joined channel succeeds without a second check.
    pub fn join(&self, channel: &Arc<Channel>) -> Result<(), DomainError> {
        let Some(me) = self.handle() else {
            return Ok(());
        };

        if !self.is_joined(channel) {
            channel.join_policy().check(self, channel)?;
        }

        let joined = {
            let mut state = self.state.write();
            if state.position(channel).is_none() {
                state.channels.push(Arc::clone(channel));
                true
            } else {
                false
            }
        };
        channel.add_target(me);

        if joined {
            debug!(chatter = %self.id(), channel = %channel.key(), "Joined channel");
            self.update_view();
        }
        Ok(())
    }

    /// Leave a channel; clears the active channel if it was this one
    pub fn leave(&self, channel: &Channel) {
        if self.empty {
            return;
        }

        let left = {
            let mut state = self.state.write();
            if state
                .active_channel
                .as_ref()
                .is_some_and(|active| active.key() == channel.key())
            {
                state.active_channel = None;
            }
            match state.position(channel) {
                Some(index) => {
                    state.channels.remove(index);
                    true
                }
                None => false,
            }
        };
        channel.remove_target_id(&self.target_id());

        if left {
            debug!(chatter = %self.id(), channel = %channel.key(), "Left channel");
            self.update_view();
        }
    }

    /// Leave every joined channel
    pub fn leave_all(&self) {
        let channels = self.state.read().channels.clone();
        for channel in channels {
            self.leave(&channel);
        }
    }

    /// Set or clear the active channel; a channel is joined first
    pub fn set_active_channel(&self, channel: Option<&Arc<Channel>>) -> Result<(), DomainError> {
        if self.empty {
            return Ok(());
        }

        match channel {
            Some(channel) => {
                self.join(channel)?;
                let mut state = self.state.write();
                if state.position(channel).is_some() {
                    state.active_channel = Some(Arc::clone(channel));
                }
            }
            None => {
                self.state.write().active_channel = None;
            }
        }

        trace!(
            chatter = %self.id(),
            channel = channel.map(|c| c.key()),
            "Active channel changed"
        );
        self.update_view();
        Ok(())
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Start a message sent by this chatter
    pub fn message(&self, text: impl Into<String>) -> Draft {
        Message::with_text(text).source(self.identity.clone())
    }

    /// Received messages, newest first
    pub fn messages(&self) -> Vec<Message> {
        self.state.read().messages.iter().cloned().collect()
    }

    pub fn last_message(&self) -> Option<Message> {
        self.state.read().messages.last().cloned()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        !self.empty && self.permissions.has_permission(permission)
    }

    /// Re-render the chatter's view
    pub fn update_view(&self) {
        if !self.empty {
            self.view.update(self);
        }
    }
}

impl MessageTarget for Chatter {
    fn target_id(&self) -> TargetId {
        TargetId::Chatter(self.id())
    }

    fn deliver(&self, message: &Message, _delivery: &mut Delivery) {
        if self.empty {
            return;
        }

        self.state.write().messages.push(message.clone());
        trace!(chatter = %self.id(), message = %message.id(), "Message received");
        self.update_view();
    }

    fn as_chatter(&self) -> Option<&Chatter> {
        Some(self)
    }
}

impl PartialEq for Chatter {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Chatter {}

impl fmt::Debug for Chatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let channels: Vec<&str> = state.channels.iter().map(|c| c.key()).collect();
        f.debug_struct("Chatter")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("channels", &channels)
            .field("active_channel", &state.active_channel.as_ref().map(|c| c.key()))
            .finish_non_exhaustive()
    }
}

/// Builder for [`Chatter`]
pub struct ChatterBuilder {
    identity: Identity,
    permissions: Arc<dyn PermissionHandler>,
    view: Arc<dyn ViewConnector>,
    history_size: usize,
}

impl ChatterBuilder {
    fn new(identity: Identity) -> Self {
        Self {
            identity,
            permissions: Arc::new(DenyAllPermissions),
            view: Arc::new(NoopView),
            history_size: MessageHistory::DEFAULT_CAPACITY,
        }
    }

    #[must_use]
    pub fn permission_handler(mut self, permissions: Arc<dyn PermissionHandler>) -> Self {
        self.permissions = permissions;
        self
    }

    #[must_use]
    pub fn view_connector(mut self, view: Arc<dyn ViewConnector>) -> Self {
        self.view = view;
        self
    }

    /// Number of received messages kept
    #[must_use]
    pub fn history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size;
        self
    }

    pub fn build(self) -> Arc<Chatter> {
        Arc::new_cyclic(|me| Chatter {
            identity: self.identity,
            me: me.clone(),
            state: RwLock::new(ChatterState::new(self.history_size)),
            permissions: self.permissions,
            view: self.view,
            empty: false,
        })
    }
}
