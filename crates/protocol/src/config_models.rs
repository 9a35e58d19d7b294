//! Global configuration models for `.proposal-kit/config.toml`.
//!
//! Every section and key is optional; missing values take the defaults
//! below.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Represents global settings from `.proposal-kit/config.toml`.
///
/// # Example
///
/// ```toml
/// # .proposal-kit/config.toml
/// [server]
/// host = "0.0.0.0"
/// port = 8080
/// generate_timeout_secs = 60
///
/// [poller]
/// interval_ms = 500
///
/// [retention]
/// max_finished_runs = 16
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub retention: RetentionConfig,
}

/// `[server]` section.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long `POST /generate` waits for its run before answering 504.
    #[serde(default = "default_generate_timeout")]
    #[ts(type = "number")]
    pub generate_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            generate_timeout_secs: default_generate_timeout(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}
fn default_generate_timeout() -> u64 {
    30
}

/// `[poller]` section.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct PollerConfig {
    /// Delay between progress polls.
    #[serde(default = "default_interval_ms")]
    #[ts(type = "number")]
    pub interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

/// `[retention]` section.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct RetentionConfig {
    /// Finished runs kept in memory before the oldest are evicted.
    #[serde(default = "default_max_finished_runs")]
    pub max_finished_runs: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_finished_runs: default_max_finished_runs(),
        }
    }
}

fn default_max_finished_runs() -> usize {
    64
}
