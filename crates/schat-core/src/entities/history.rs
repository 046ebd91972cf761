//! Message history - bounded, most-recent-first

use std::collections::VecDeque;

use uuid::Uuid;

use super::Message;

/// Bounded history of received messages, newest first.
///
/// Every delivery is recorded; repeated sends of one message appear once per send.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    entries: VecDeque<Message>,
    capacity: usize,
}

impl MessageHistory {
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Create a history holding at most `capacity` messages (at least one)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Record a message, evicting the oldest one when full
    pub fn push(&mut self, message: Message) {
        self.entries.push_front(message);
        self.entries.truncate(self.capacity);
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.iter().any(|message| message.id() == id)
    }

    /// The most recent message
    pub fn last(&self) -> Option<&Message> {
        self.entries.front()
    }

    /// Messages, newest first
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_recent_first() {
        let mut history = MessageHistory::default();
        history.push(Message::with_text("first").build());
        history.push(Message::with_text("second").build());

        let texts: Vec<&str> = history.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert_eq!(history.last().map(Message::text), Some("second"));
    }

    #[test]
    fn test_records_each_delivery() {
        let mut history = MessageHistory::default();
        let message = Message::with_text("hi").build();

        history.push(message.clone());
        history.push(message.clone());

        assert_eq!(history.len(), 2);
        assert!(history.contains(message.id()));
    }

    #[test]
    fn test_bounded() {
        let mut history = MessageHistory::with_capacity(2);
        for text in ["a", "b", "c"] {
            history.push(Message::with_text(text).build());
        }

        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(Message::text), Some("c"));
        assert_eq!(MessageHistory::with_capacity(0).capacity(), 1);
    }
}
