// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-zero intervals and the relation between the typing
//! refresh threshold and the staleness window.

use crate::diagnostic::ConfigError;
use crate::model::ConfabConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ConfabConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let host = config.gateway.host.trim();
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.stream.heartbeat_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "stream.heartbeat_ms must be positive".to_string(),
        });
    }

    if config.stream.poll_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "stream.poll_ms must be positive".to_string(),
        });
    }

    if config.stream.page_size == 0 {
        errors.push(ConfigError::Validation {
            message: "stream.page_size must be positive".to_string(),
        });
    }

    if config.stream.store_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "stream.store_timeout_ms must be positive".to_string(),
        });
    } else if config.stream.store_timeout_ms >= config.stream.heartbeat_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "stream.store_timeout_ms ({}) must be below stream.heartbeat_ms ({}) \
                 so a slow store cannot stall keep-alives",
                config.stream.store_timeout_ms, config.stream.heartbeat_ms
            ),
        });
    }

    if config.presence.staleness_ms <= 0 {
        errors.push(ConfigError::Validation {
            message: "presence.staleness_ms must be positive".to_string(),
        });
    }

    if config.presence.refresh_ms <= 0 {
        errors.push(ConfigError::Validation {
            message: "presence.refresh_ms must be positive".to_string(),
        });
    }

    // The one load-bearing relation between the presence tunables: a refresh
    // suppressed for longer than the staleness window would let live typing
    // state expire mid-burst.
    if config.presence.refresh_ms >= config.presence.staleness_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "presence.refresh_ms ({}) must be less than presence.staleness_ms ({})",
                config.presence.refresh_ms, config.presence.staleness_ms
            ),
        });
    }

    if config.bus.capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "bus.capacity must be positive".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
