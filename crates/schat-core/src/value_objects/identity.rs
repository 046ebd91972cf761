//! Identity - who a chatter or a message source is

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;
use uuid::Uuid;

static NIL: LazyLock<Identity> = LazyLock::new(|| Identity::with_id(Uuid::nil(), ""));

/// Identity of a user or message source
///
/// Equality is by `id` only; names may change without changing who it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    id: Uuid,
    name: String,
    display_name: String,
}

impl Identity {
    /// Create an identity with a random id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Create an identity with a known id
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            display_name: name.clone(),
            name,
        }
    }

    /// The sentinel identity used by system messages
    pub fn nil() -> Self {
        NIL.clone()
    }

    /// Set the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name shown to other users
    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Check if this is the nil identity
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.id.is_nil()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::nil()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_identity() {
        let nil = Identity::nil();
        assert!(nil.is_nil());
        assert_eq!(nil.name(), "");
        assert_eq!(nil, Identity::nil());
    }

    #[test]
    fn test_equality_by_id() {
        let id = Uuid::new_v4();
        let a = Identity::with_id(id, "Notch");
        let b = Identity::with_id(id, "Renamed").with_display_name("Someone");
        assert_eq!(a, b);
        assert_eq!(b.display_name(), "Someone");
        assert_ne!(a, Identity::new("Notch"));
    }

    #[test]
    fn test_display_name_defaults_to_name() {
        let identity = Identity::new("Notch");
        assert_eq!(identity.display_name(), "Notch");
        assert!(!identity.is_nil());
    }
}
