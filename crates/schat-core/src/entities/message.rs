//! Message entity - an identified piece of text on its way to targets

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::settings::{Setting, SettingValue, Settings};
use crate::value_objects::Identity;

use super::target::IntoTarget;
use super::{Channel, Targets};

/// Kind of a message, derived from its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Sent without a source
    System,
    /// Sent by a chatter or another identified source
    Chat,
}

/// Message entity
///
/// Two messages are equal iff their ids match.
#[derive(Clone)]
pub struct Message {
    id: Uuid,
    source: Identity,
    text: String,
    timestamp: DateTime<Utc>,
    targets: Targets,
    settings: Settings,
}

impl Message {
    /// Start building a message
    #[must_use]
    pub fn draft() -> Draft {
        Draft::default()
    }

    /// Start building a message with the given text
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Draft {
        Draft::default().text(text)
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn source(&self) -> &Identity {
        &self.source
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Read-only targets the message was addressed to
    #[inline]
    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get<V: SettingValue>(&self, setting: &Setting<V>) -> V {
        self.settings.get(setting)
    }

    pub fn message_type(&self) -> MessageType {
        if self.source.is_nil() {
            MessageType::System
        } else {
            MessageType::Chat
        }
    }

    /// Channels among the targets
    pub fn channels(&self) -> Vec<Arc<Channel>> {
        self.targets
            .snapshot()
            .iter()
            .filter_map(|target| target.as_channel().and_then(Channel::handle))
            .collect()
    }

    /// Draft of the same message (same id and timestamp) for rewriting
    #[must_use]
    pub fn copy(&self) -> Draft {
        Draft {
            id: Some(self.id),
            timestamp: Some(self.timestamp),
            source: self.source.clone(),
            text: self.text.clone(),
            targets: self.targets.copy(),
            settings: self.settings.clone(),
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("source", &self.source.name())
            .field("text", &self.text)
            .field("timestamp", &self.timestamp)
            .field("targets", &self.targets.ids())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Message`]
#[derive(Debug, Clone, Default)]
pub struct Draft {
    id: Option<Uuid>,
    timestamp: Option<DateTime<Utc>>,
    source: Identity,
    text: String,
    targets: Targets,
    settings: Settings,
}

impl Draft {
    /// Set the source; without one the message is a system message
    #[must_use]
    pub fn source(mut self, source: Identity) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add a target
    #[must_use]
    pub fn to(self, target: impl IntoTarget) -> Self {
        self.targets.insert(target.into_target());
        self
    }

    /// Replace the targets with a copy of `targets`
    #[must_use]
    pub fn targets(mut self, targets: &Targets) -> Self {
        self.targets = targets.copy();
        self
    }

    #[must_use]
    pub fn set<V: SettingValue>(mut self, setting: &Setting<V>, value: V) -> Self {
        self.settings.set(setting, value);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the message; a fresh id and timestamp are assigned unless copied
    #[must_use]
    pub fn build(self) -> Message {
        Message {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            source: self.source,
            text: self.text,
            targets: self.targets.unmodifiable(),
            settings: self.settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: Setting<String> = Setting::new("format", String::new);

    #[test]
    fn test_message_type_is_derived() {
        let system = Message::with_text("restart").build();
        assert_eq!(system.message_type(), MessageType::System);

        let chat = Message::with_text("hi").source(Identity::new("Notch")).build();
        assert_eq!(chat.message_type(), MessageType::Chat);
        assert_eq!(chat.source().name(), "Notch");
    }

    #[test]
    fn test_equality_by_id() {
        let message = Message::with_text("hi").build();
        let rewritten = message.copy().text("changed").build();

        assert_eq!(message, rewritten);
        assert_eq!(rewritten.timestamp(), message.timestamp());
        assert_ne!(message, Message::with_text("hi").build());
    }

    #[test]
    fn test_targets_are_read_only() {
        let channel = Channel::builder("global").build().unwrap();
        let message = Message::with_text("hi").to(Arc::clone(&channel)).build();

        assert!(message.targets().is_unmodifiable());
        assert!(message.targets().clear().is_err());
        assert_eq!(message.channels().len(), 1);
    }

    #[test]
    fn test_settings_travel_with_copy() {
        let message = Message::with_text("hi")
            .set(&FORMAT, "<{source}> {text}".to_string())
            .build();

        assert_eq!(message.get(&FORMAT), "<{source}> {text}");
        assert_eq!(message.copy().build().get(&FORMAT), "<{source}> {text}");
    }
}
