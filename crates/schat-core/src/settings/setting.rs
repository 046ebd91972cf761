//! Setting descriptors - typed keys with a default value

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Values that can be stored in [`Settings`](super::Settings).
pub trait SettingValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> SettingValue for T {}

/// A typed configuration key with its default value.
///
/// Descriptors are immutable and compare by key; two descriptors with the same
/// key and value type address the same entry in a [`Settings`](super::Settings)
/// even when they were constructed separately.
pub struct Setting<V> {
    key: Cow<'static, str>,
    default: fn() -> V,
}

impl<V> Setting<V> {
    /// Create a setting with a static key, usable in `const` items
    pub const fn new(key: &'static str, default: fn() -> V) -> Self {
        Self {
            key: Cow::Borrowed(key),
            default,
        }
    }

    /// Create a setting whose key is only known at runtime
    pub fn dynamic(key: impl Into<String>, default: fn() -> V) -> Self {
        Self {
            key: Cow::Owned(key.into()),
            default,
        }
    }

    /// The key of the setting
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value used when a [`Settings`](super::Settings) has no mapping
    #[inline]
    pub fn default_value(&self) -> V {
        (self.default)()
    }
}

impl<V: 'static> Setting<V> {
    pub(crate) fn slot(&self) -> SettingKey {
        SettingKey {
            type_id: TypeId::of::<V>(),
            key: self.key.clone(),
        }
    }
}

impl<V> Clone for Setting<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            default: self.default,
        }
    }
}

impl<V> PartialEq for Setting<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<V> Eq for Setting<V> {}

impl<V> Hash for Setting<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<V> fmt::Debug for Setting<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("key", &self.key)
            .field("type", &std::any::type_name::<V>())
            .finish()
    }
}

/// Map key of a setting: value type plus key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SettingKey {
    type_id: TypeId,
    key: Cow<'static, str>,
}

impl SettingKey {
    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}
