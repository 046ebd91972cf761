//! Channel entity - a named target fanning messages out to its members

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::error::DomainError;
use crate::events::{Cancellable, EventBus, SendChannelMessageEvent};
use crate::settings::{Setting, SettingValue, Settings};
use crate::traits::{JoinPolicy, PermissionJoinPolicy};
use crate::value_objects::TargetId;

use super::target::{Delivery, IntoTarget, MessageTarget};
use super::{Message, MessageHistory, Targets};

const DEFAULT_JOIN_PERMISSION: &str = "schat.channel.default.join";

/// Channel entity
///
/// Channels are identified by their normalized key; uniqueness of keys is
/// enforced by the repository the channel is registered in.
pub struct Channel {
    key: String,
    me: Weak<Channel>,
    settings: RwLock<Settings>,
    targets: Targets,
    messages: Mutex<MessageHistory>,
    event_bus: EventBus,
    join_policy: Arc<dyn JoinPolicy>,
}

// ============================================================================
// Settings
// ============================================================================

impl Channel {
    /// Name shown to chatters; defaults to the key
    pub const DISPLAY_NAME: Setting<String> = Setting::new("name", String::new);

    /// Lower priorities sort first
    pub const PRIORITY: Setting<i32> = Setting::new("priority", || 100);

    /// Joining requires [`JOIN_PERMISSION`](Self::JOIN_PERMISSION)
    pub const REQUIRES_JOIN_PERMISSION: Setting<bool> = Setting::new("protected", || false);

    pub const JOIN_PERMISSION: Setting<String> =
        Setting::new("join_permission", || DEFAULT_JOIN_PERMISSION.to_string());

    /// Messages are visible server-wide
    pub const GLOBAL: Setting<bool> = Setting::new("global", || true);

    /// Conversation between two chatters
    pub const PRIVATE: Setting<bool> = Setting::new("private", || false);

    /// Not listed to chatters that have not joined
    pub const HIDDEN: Setting<bool> = Setting::new("hidden", || false);

    /// Every chatter joins on registration
    pub const AUTO_JOIN: Setting<bool> = Setting::new("auto_join", || false);

    /// Cannot be left through the interactor
    pub const FORCED: Setting<bool> = Setting::new("forced", || false);
}

impl Channel {
    /// Start building a channel
    pub fn builder(key: impl Into<String>) -> ChannelBuilder {
        ChannelBuilder::new(key)
    }

    /// Normalize a channel key: trimmed, lower case, `[a-z0-9_-]+`
    pub fn normalize_key(key: &str) -> Result<String, DomainError> {
        let normalized = key.trim().to_lowercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if valid {
            Ok(normalized)
        } else {
            Err(DomainError::InvalidChannelKey(key.to_string()))
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Shared handle to this channel
    pub fn handle(&self) -> Option<Arc<Channel>> {
        self.me.upgrade()
    }

    pub fn display_name(&self) -> String {
        self.get(&Self::DISPLAY_NAME)
    }

    pub fn get<V: SettingValue>(&self, setting: &Setting<V>) -> V {
        self.settings.read().get(setting)
    }

    /// Check a boolean setting
    pub fn is(&self, setting: &Setting<bool>) -> bool {
        self.get(setting)
    }

    pub fn set<V: SettingValue>(&self, setting: &Setting<V>, value: V) -> Option<V> {
        self.settings.write().set(setting, value)
    }

    /// Copy of the current settings
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Live read-only view of the members
    pub fn targets(&self) -> Targets {
        self.targets.unmodifiable()
    }

    pub fn add_target(&self, target: impl IntoTarget) -> bool {
        let target = target.into_target();
        let id = target.target_id();
        let added = self.targets.insert(target);
        if added {
            trace!(channel = %self.key, target = %id, "Target added");
        }
        added
    }

    pub fn remove_target(&self, target: &dyn MessageTarget) -> bool {
        self.remove_target_id(&target.target_id())
    }

    pub fn remove_target_id(&self, id: &TargetId) -> bool {
        let removed = self.targets.delete(id);
        if removed {
            trace!(channel = %self.key, target = %id, "Target removed");
        }
        removed
    }

    pub fn is_member(&self, id: &TargetId) -> bool {
        self.targets.contains_id(id)
    }

    pub fn join_policy(&self) -> &Arc<dyn JoinPolicy> {
        &self.join_policy
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Messages delivered through this channel, newest first
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().iter().cloned().collect()
    }

    pub fn last_message(&self) -> Option<Message> {
        self.messages.lock().last().cloned()
    }
}

impl MessageTarget for Channel {
    fn target_id(&self) -> TargetId {
        TargetId::Channel(self.key.clone())
    }

    fn deliver(&self, message: &Message, delivery: &mut Delivery) {
        let Some(channel) = self.handle() else {
            return;
        };

        let event = self
            .event_bus
            .post(SendChannelMessageEvent::new(channel, message.clone()));
        if event.is_cancelled() {
            debug!(channel = %self.key, message = %message.id(), "Channel message cancelled");
            return;
        }

        let (message, targets) = event.into_parts();
        self.messages.lock().push(message.clone());
        trace!(
            channel = %self.key,
            message = %message.id(),
            targets = targets.len(),
            "Delivering channel message"
        );
        targets.deliver(&message, delivery);
    }

    fn as_channel(&self) -> Option<&Channel> {
        Some(self)
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Channel {}

impl Hash for Channel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Channel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Channel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get(&Self::PRIORITY)
            .cmp(&other.get(&Self::PRIORITY))
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("key", &self.key)
            .field("settings", &*self.settings.read())
            .field("targets", &self.targets.ids())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Channel`]
pub struct ChannelBuilder {
    key: String,
    settings: Settings,
    targets: Targets,
    event_bus: EventBus,
    join_policy: Arc<dyn JoinPolicy>,
}

impl ChannelBuilder {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            settings: Settings::new(),
            targets: Targets::new(),
            event_bus: EventBus::empty(),
            join_policy: Arc::new(PermissionJoinPolicy),
        }
    }

    #[must_use]
    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.set(&Channel::DISPLAY_NAME, name.into())
    }

    #[must_use]
    pub fn set<V: SettingValue>(mut self, setting: &Setting<V>, value: V) -> Self {
        self.settings.set(setting, value);
        self
    }

    /// Start from a copy of existing settings
    #[must_use]
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.settings.copy_from(settings);
        self
    }

    /// Initial members
    #[must_use]
    pub fn targets(mut self, targets: &Targets) -> Self {
        self.targets = targets.copy();
        self
    }

    #[must_use]
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    #[must_use]
    pub fn join_policy(mut self, join_policy: Arc<dyn JoinPolicy>) -> Self {
        self.join_policy = join_policy;
        self
    }

    /// Build the channel, normalizing its key
    pub fn build(self) -> Result<Arc<Channel>, DomainError> {
        let key = Channel::normalize_key(&self.key)?;

        let mut settings = self.settings;
        if !settings.contains(&Channel::DISPLAY_NAME) {
            settings.set(&Channel::DISPLAY_NAME, key.clone());
        }
        if !settings.contains(&Channel::JOIN_PERMISSION) {
            settings.set(&Channel::JOIN_PERMISSION, format!("schat.channel.{key}.join"));
        }

        Ok(Arc::new_cyclic(|me| Channel {
            key,
            me: me.clone(),
            settings: RwLock::new(settings),
            targets: self.targets,
            messages: Mutex::new(MessageHistory::default()),
            event_bus: self.event_bus,
            join_policy: self.join_policy,
        }))
    }
}

impl fmt::Debug for ChannelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBuilder")
            .field("key", &self.key)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
