//! Settings - typed, heterogeneous key-value store

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::setting::{Setting, SettingKey, SettingValue};

type Supplier<V> = Arc<dyn Fn() -> Option<V> + Send + Sync>;

/// Type-erased [`Supplier`]; the concrete type is fixed by the [`SettingKey`]
type Entry = Arc<dyn Any + Send + Sync>;

/// Typed configuration owned by a single entity.
///
/// Every entry maps a [`Setting`] to a value supplier. Reads never fail: an
/// unmapped setting, or a supplier yielding `None`, resolves to the setting's
/// own default.
///
/// `Clone` produces an independent copy; suppliers are shared, the mapping is not.
#[derive(Clone, Default)]
pub struct Settings {
    entries: HashMap<SettingKey, Entry>,
}

impl Settings {
    /// Create an empty settings collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a settings collection
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Start a builder pre-filled with a copy of these settings
    #[must_use]
    pub fn to_builder(&self) -> SettingsBuilder {
        SettingsBuilder {
            settings: self.clone(),
        }
    }

    /// Resolve the value of a setting, falling back to its default
    pub fn get<V: SettingValue>(&self, setting: &Setting<V>) -> V {
        self.resolve(setting)
            .unwrap_or_else(|| setting.default_value())
    }

    /// Resolve the value of a setting, or `fallback` if it is not mapped
    pub fn get_or_default<V: SettingValue>(&self, setting: &Setting<V>, fallback: V) -> V {
        self.get_or_default_from(setting, || fallback)
    }

    /// Resolve the value of a setting, or call `fallback` if it is not mapped
    pub fn get_or_default_from<V, F>(&self, setting: &Setting<V>, fallback: F) -> V
    where
        V: SettingValue,
        F: FnOnce() -> V,
    {
        if self.contains(setting) {
            self.get(setting)
        } else {
            fallback()
        }
    }

    /// Map a setting to a static value.
    ///
    /// Returns the value the setting resolved to before, which is the
    /// default when it was not mapped.
    pub fn set<V: SettingValue>(&mut self, setting: &Setting<V>, value: V) -> Option<V> {
        self.set_dynamic(setting, move || Some(value.clone()))
    }

    /// Map a setting to a supplier that is evaluated on every read.
    ///
    /// Returns the value the setting resolved to before.
    pub fn set_dynamic<V, F>(&mut self, setting: &Setting<V>, supplier: F) -> Option<V>
    where
        V: SettingValue,
        F: Fn() -> Option<V> + Send + Sync + 'static,
    {
        let previous = Some(self.get(setting));
        let supplier: Supplier<V> = Arc::new(supplier);
        self.entries.insert(setting.slot(), Arc::new(supplier));
        previous
    }

    /// Remove the mapping of a setting, returning its last resolved value
    pub fn remove<V: SettingValue>(&mut self, setting: &Setting<V>) -> Option<V> {
        let previous = self.contains(setting).then(|| self.get(setting));
        self.entries.remove(&setting.slot());
        previous
    }

    /// Check if a mapping exists, regardless of what the supplier yields
    pub fn contains<V: SettingValue>(&self, setting: &Setting<V>) -> bool {
        self.entries.contains_key(&setting.slot())
    }

    /// Keys of all mapped settings
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(SettingKey::key)
    }

    /// Number of mapped settings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no setting is mapped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy all mappings of `other` into these settings, replacing existing ones
    pub fn copy_from(&mut self, other: &Settings) -> &mut Self {
        self.entries.extend(
            other
                .entries
                .iter()
                .map(|(key, entry)| (key.clone(), Arc::clone(entry))),
        );
        self
    }

    fn resolve<V: SettingValue>(&self, setting: &Setting<V>) -> Option<V> {
        self.entries
            .get(&setting.slot())
            .and_then(|entry| entry.downcast_ref::<Supplier<V>>())
            .and_then(|supplier| supplier())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Settings").field("keys", &keys).finish()
    }
}

/// Builder for [`Settings`]
#[derive(Clone, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Map a setting to a static value
    #[must_use]
    pub fn with_static<V: SettingValue>(mut self, setting: &Setting<V>, value: V) -> Self {
        self.settings.set(setting, value);
        self
    }

    /// Map a setting to a supplier that is re-evaluated on every read
    #[must_use]
    pub fn with_dynamic<V, F>(mut self, setting: &Setting<V>, supplier: F) -> Self
    where
        V: SettingValue,
        F: Fn() -> Option<V> + Send + Sync + 'static,
    {
        self.settings.set_dynamic(setting, supplier);
        self
    }

    /// Copy every mapping of an existing settings collection
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.settings.copy_from(settings);
        self
    }

    /// Build the settings
    #[must_use]
    pub fn build(self) -> Settings {
        self.settings
    }
}

impl fmt::Debug for SettingsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SettingsBuilder").field(&self.settings).finish()
    }
}
