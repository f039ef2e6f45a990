//! # Remindd Config
//!
//! TOML configuration for the reminder service: schema with defaults,
//! `${VAR}` environment expansion, and a validation pass.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    ChannelsConfig, Config, DispatcherSettings, GatewayConfig, LogConfig, QueueSettings,
    SchedulerSettings, ServerConfig, StoreConfig,
};
pub use validator::ConfigValidator;
