//! # schat-common
//!
//! Shared utilities including configuration, error handling, telemetry, and
//! the runtime that wires a configured chat core together.

pub mod config;
pub mod error;
pub mod runtime;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{ChannelConfig, ChannelFlag, ChatConfig, ConfigError, Environment};
pub use error::{AppError, AppResult};
pub use runtime::ChatRuntime;
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
