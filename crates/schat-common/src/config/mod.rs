//! Configuration structs

mod app_config;

pub use app_config::{ChannelConfig, ChannelFlag, ChatConfig, ConfigError, Environment};
