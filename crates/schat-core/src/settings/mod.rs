//! Typed settings shared by every configurable entity

mod setting;
mod settings;

pub use setting::{Setting, SettingValue};
pub use settings::{Settings, SettingsBuilder};
