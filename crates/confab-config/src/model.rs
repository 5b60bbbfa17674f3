// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Confab event delivery service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The stream and presence tunables default to the
//! values the delivery design was written against; they are tunable, with the
//! one load-bearing relation (`presence.refresh_ms < presence.staleness_ms`)
//! enforced by validation.

use serde::{Deserialize, Serialize};

/// Top-level Confab configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfabConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Stream session and reconciler tunables.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Typing presence tunables.
    #[serde(default)]
    pub presence: PresenceConfig,

    /// In-process event bus settings.
    #[serde(default)]
    pub bus: BusConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "confab".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for gateway auth. `None` rejects all requests (fail-closed).
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8780
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "confab.db".to_string()
}

/// Stream session and reconciler tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Keep-alive comment frame interval in milliseconds.
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,

    /// Durable-store polling interval in milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,

    /// Maximum events fetched per poll.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Bound on a single store query, in milliseconds. Must stay well under
    /// the heartbeat interval so a slow store cannot stall keep-alives.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            heartbeat_ms: default_heartbeat_ms(),
            poll_ms: default_poll_ms(),
            page_size: default_page_size(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

fn default_heartbeat_ms() -> u64 {
    15_000
}

fn default_poll_ms() -> u64 {
    1_000
}

fn default_page_size() -> usize {
    50
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

/// Typing presence tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceConfig {
    /// Age in milliseconds beyond which a typing row is ignored by readers.
    #[serde(default = "default_staleness_ms")]
    pub staleness_ms: i64,

    /// Minimum interval between refresh upserts for a user already typing.
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: i64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            staleness_ms: default_staleness_ms(),
            refresh_ms: default_refresh_ms(),
        }
    }
}

fn default_staleness_ms() -> i64 {
    10_000
}

fn default_refresh_ms() -> i64 {
    3_000
}

/// In-process event bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Per-conversation broadcast channel capacity.
    #[serde(default = "default_bus_capacity")]
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: default_bus_capacity(),
        }
    }
}

fn default_bus_capacity() -> usize {
    256
}
