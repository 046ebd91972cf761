//! Chat configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use validator::Validate;

/// Main chat configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatConfig {
    #[serde(default)]
    pub env: Environment,

    /// Log every posted event and handler invocation
    #[serde(default)]
    pub debug_events: bool,

    /// Messages kept per chatter
    #[serde(default = "default_message_history")]
    #[validate(range(min = 1, max = 10000, message = "Message history must be 1-10000"))]
    pub message_history: usize,

    #[serde(default = "default_channels")]
    #[validate(nested)]
    pub channels: Vec<ChannelConfig>,

    /// Channel new chatters are moved into when they have no active channel
    #[serde(default = "default_channel")]
    pub default_channel: Option<String>,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidValue("SCHAT_ENV", s.to_string())),
        }
    }
}

/// A channel registered at startup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct ChannelConfig {
    #[validate(length(min = 1, max = 64, message = "Channel key must be 1-64 characters"))]
    pub key: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: Option<String>,

    #[serde(default = "default_priority")]
    #[validate(range(min = -1000, max = 1000, message = "Priority must be between -1000 and 1000"))]
    pub priority: i32,

    /// Joining requires the channel's join permission
    #[serde(default)]
    pub protected: bool,

    /// Overrides the `schat.channel.<key>.join` permission
    #[serde(default)]
    pub join_permission: Option<String>,

    #[serde(default)]
    pub auto_join: bool,

    #[serde(default)]
    pub forced: bool,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default = "default_global")]
    pub global: bool,
}

/// Flags accepted in the `key:flag+flag` channel form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFlag {
    Protected,
    AutoJoin,
    Forced,
    Hidden,
    Global,
    Local,
}

impl FromStr for ChannelFlag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "protected" => Ok(Self::Protected),
            "auto_join" | "autojoin" => Ok(Self::AutoJoin),
            "forced" => Ok(Self::Forced),
            "hidden" => Ok(Self::Hidden),
            "global" => Ok(Self::Global),
            "local" => Ok(Self::Local),
            _ => Err(ConfigError::InvalidValue("SCHAT_CHANNELS", s.to_string())),
        }
    }
}

impl ChannelConfig {
    /// A channel with default settings
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: None,
            priority: default_priority(),
            protected: false,
            join_permission: None,
            auto_join: false,
            forced: false,
            hidden: false,
            global: default_global(),
        }
    }

    /// Parse one `key[:flag+flag]` entry
    pub fn parse(entry: &str) -> Result<Self, ConfigError> {
        let (key, flags) = match entry.split_once(':') {
            Some((key, flags)) => (key.trim(), flags),
            None => (entry.trim(), ""),
        };
        if key.is_empty() {
            return Err(ConfigError::InvalidValue("SCHAT_CHANNELS", entry.to_string()));
        }

        flags
            .split('+')
            .filter(|flag| !flag.trim().is_empty())
            .try_fold(Self::new(key), |config, flag| -> Result<Self, ConfigError> {
                Ok(config.with_flag(flag.parse()?))
            })
    }

    #[must_use]
    pub fn with_flag(mut self, flag: ChannelFlag) -> Self {
        match flag {
            ChannelFlag::Protected => self.protected = true,
            ChannelFlag::AutoJoin => self.auto_join = true,
            ChannelFlag::Forced => self.forced = true,
            ChannelFlag::Hidden => self.hidden = true,
            ChannelFlag::Global => self.global = true,
            ChannelFlag::Local => self.global = false,
        }
        self
    }

    /// Whether `key` names this channel, ignoring case and surrounding spaces
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.key.trim().eq_ignore_ascii_case(key.trim())
    }
}

// Default value functions
fn default_message_history() -> usize {
    100
}

fn default_channels() -> Vec<ChannelConfig> {
    vec![ChannelConfig::new("global").with_flag(ChannelFlag::AutoJoin)]
}

#[allow(clippy::unnecessary_wraps)]
fn default_channel() -> Option<String> {
    Some("global".to_string())
}

fn default_priority() -> i32 {
    100
}

fn default_global() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            debug_events: false,
            message_history: default_message_history(),
            channels: default_channels(),
            default_channel: default_channel(),
        }
    }
}

impl ChatConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable holds an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("SCHAT_ENV") {
            config.env = value.parse()?;
        }
        if let Some(value) = lookup("SCHAT_DEBUG_EVENTS") {
            config.debug_events = parse_bool("SCHAT_DEBUG_EVENTS", &value)?;
        }
        if let Some(value) = lookup("SCHAT_MESSAGE_HISTORY") {
            config.message_history = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SCHAT_MESSAGE_HISTORY", value.clone()))?;
        }
        if let Some(value) = lookup("SCHAT_CHANNELS") {
            config.channels = value
                .split(',')
                .filter(|entry| !entry.trim().is_empty())
                .map(ChannelConfig::parse)
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = lookup("SCHAT_DEFAULT_CHANNEL") {
            let value = value.trim();
            config.default_channel = (!value.is_empty()).then(|| value.to_string());
        }

        config.check()?;
        Ok(config)
    }

    /// Validate field ranges and that the default channel is configured
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(key) = &self.default_channel {
            if self.channel(key).is_none() {
                return Err(ConfigError::InvalidValue("SCHAT_DEFAULT_CHANNEL", key.clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn channel(&self, key: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|channel| channel.matches(key))
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue(name, value.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
