//! Target ID - stable identifier of a message target
//!
//! Rendered as a tagged string:
//! - `chatter:<uuid>`
//! - `channel:<key>`
//! - `console`
//! - `custom:<name>`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// Prefix of chatter targets
pub const CHATTER_PREFIX: &str = "chatter:";
/// Prefix of channel targets
pub const CHANNEL_PREFIX: &str = "channel:";
/// Prefix of custom targets
pub const CUSTOM_PREFIX: &str = "custom:";
/// The console target
pub const CONSOLE: &str = "console";

/// Identity of a message target.
///
/// Two targets are the same receiver iff their ids are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetId {
    /// A chatter, by unique id
    Chatter(Uuid),
    /// A channel, by normalized key
    Channel(String),
    /// The server console
    Console,
    /// Any other receiver registered by an adapter
    Custom(String),
}

impl TargetId {
    /// Check if this id refers to a chatter
    #[inline]
    pub fn is_chatter(&self) -> bool {
        matches!(self, Self::Chatter(_))
    }

    /// Check if this id refers to a channel
    #[inline]
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }

    /// Get the chatter uuid, if this is a chatter id
    pub fn chatter_id(&self) -> Option<Uuid> {
        match self {
            Self::Chatter(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the channel key, if this is a channel id
    pub fn channel_key(&self) -> Option<&str> {
        match self {
            Self::Channel(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chatter(id) => write!(f, "{CHATTER_PREFIX}{id}"),
            Self::Channel(key) => write!(f, "{CHANNEL_PREFIX}{key}"),
            Self::Console => f.write_str(CONSOLE),
            Self::Custom(name) => write!(f, "{CUSTOM_PREFIX}{name}"),
        }
    }
}

impl FromStr for TargetId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidTargetId(s.to_string());

        if s == CONSOLE {
            return Ok(Self::Console);
        }
        if let Some(id) = s.strip_prefix(CHATTER_PREFIX) {
            return Uuid::parse_str(id).map(Self::Chatter).map_err(|_| invalid());
        }
        if let Some(key) = s.strip_prefix(CHANNEL_PREFIX) {
            if key.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::Channel(key.to_string()));
        }
        if let Some(name) = s.strip_prefix(CUSTOM_PREFIX) {
            if name.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::Custom(name.to_string()));
        }
        Err(invalid())
    }
}

// Serialize as the tagged string form
impl Serialize for TargetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
