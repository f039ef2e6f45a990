//! Configuration schema.
//!
//! Every field has a default so an empty file (or no file at all) yields a
//! runnable development configuration. Times are stored as plain seconds or
//! hours and exposed as [`std::time::Duration`] accessors.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP API server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistent store.
    #[serde(default)]
    pub store: StoreConfig,

    /// Work queue.
    #[serde(default)]
    pub queue: QueueSettings,

    /// Scheduler core.
    #[serde(default)]
    pub scheduler: SchedulerSettings,

    /// Delivery dispatcher.
    #[serde(default)]
    pub dispatcher: DispatcherSettings,

    /// Notification gateways.
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Persistent store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the document collections.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".remindd").join("data"))
        .unwrap_or_else(|| PathBuf::from("/tmp/remindd/data"))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Work queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// How long a leased job stays invisible before redelivery (seconds).
    #[serde(default = "default_visibility_timeout")]
    pub visibility_timeout_secs: u64,

    /// Maximum queue depth (0 = unlimited).
    #[serde(default)]
    pub max_depth: usize,
}

fn default_visibility_timeout() -> u64 {
    60
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            visibility_timeout_secs: default_visibility_timeout(),
            max_depth: 0,
        }
    }
}

impl QueueSettings {
    /// Visibility timeout as a duration.
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }
}

/// Scheduler core configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// How far before a charge's due date the reminder fires (hours).
    #[serde(default = "default_lead_time_hours")]
    pub lead_time_hours: u64,

    /// Interval of the self-healing reconcile sweep (seconds).
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
}

fn default_lead_time_hours() -> u64 {
    72
}

fn default_reconcile_interval() -> u64 {
    60
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            lead_time_hours: default_lead_time_hours(),
            reconcile_interval_secs: default_reconcile_interval(),
        }
    }
}

impl SchedulerSettings {
    /// Lead time as a duration.
    pub fn lead_time(&self) -> Duration {
        Duration::from_secs(self.lead_time_hours * 3600)
    }

    /// Reconcile sweep interval as a duration.
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }
}

/// Delivery dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherSettings {
    /// Queue poll interval (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum concurrent in-flight sends.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Timeout applied to every gateway send (seconds).
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,

    /// Base retry delay (seconds); doubled per attempt.
    #[serde(default = "default_retry_base")]
    pub retry_base_secs: u64,

    /// Retry delay cap (seconds).
    #[serde(default = "default_retry_max")]
    pub retry_max_secs: u64,

    /// Attempt budget before a job is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_in_flight() -> usize {
    8
}

fn default_send_timeout() -> u64 {
    10
}

fn default_retry_base() -> u64 {
    30
}

fn default_retry_max() -> u64 {
    3600
}

fn default_max_attempts() -> u32 {
    5
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            max_in_flight: default_max_in_flight(),
            send_timeout_secs: default_send_timeout(),
            retry_base_secs: default_retry_base(),
            retry_max_secs: default_retry_max(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl DispatcherSettings {
    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Send timeout as a duration.
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

/// Notification gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// SMS gateway.
    #[serde(default)]
    pub sms: Option<GatewayConfig>,

    /// Email gateway.
    #[serde(default)]
    pub email: Option<GatewayConfig>,
}

/// A single HTTP notification gateway.
///
/// Tokens should come from the environment via `${VAR}` expansion, never
/// from literals checked into the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Whether the gateway is used.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Gateway endpoint URL.
    pub api_url: String,

    /// Bearer token.
    pub api_token: String,

    /// Sender identity (phone number or from-address).
    pub sender: String,
}

fn default_gateway_enabled() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional rolling log file directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}
