// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for configuration failures.
//!
//! Figment parse/deserialize errors and post-deserialization validation
//! failures are converted into [`ConfigError`] values so startup can render
//! every problem at once instead of failing on the first.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic rendering support.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// TOML parse or deserialization failure reported by Figment.
    #[error("failed to load configuration: {message}")]
    #[diagnostic(
        code(confab::config::parse),
        help(
            "configuration is merged from /etc/confab/confab.toml, \
             ~/.config/confab/confab.toml, ./confab.toml and CONFAB_* \
             environment variables"
        )
    )]
    Parse {
        /// Figment's rendered error message.
        message: String,
    },

    /// A semantic constraint violated by otherwise well-formed values.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(confab::config::validation))]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },
}

/// Convert a Figment error into one `Parse` diagnostic per underlying failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Render all collected configuration errors to stderr via miette.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::msg(format!("{error}"));
        eprintln!("{report:?}");
        if let Some(help) = error.help() {
            eprintln!("  help: {help}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_config_hierarchy_in_help() {
        let err = ConfigError::Parse {
            message: "invalid number".into(),
        };
        let help = err.help().expect("parse errors carry help").to_string();
        assert!(help.contains("confab.toml"));
        assert!(help.contains("CONFAB_"));
    }

    #[test]
    fn validation_error_displays_message() {
        let err = ConfigError::Validation {
            message: "presence.refresh_ms must be less than presence.staleness_ms".into(),
        };
        assert!(err.to_string().contains("refresh_ms"));
    }
}
