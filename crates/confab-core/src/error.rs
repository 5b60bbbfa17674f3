// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Confab event delivery service.

use thiserror::Error;

/// The primary error type used across all Confab components.
///
/// Variants follow the propagation policy of the delivery subsystem:
/// `Store` and `Timeout` are transient infrastructure failures that get
/// absorbed at the reconciler boundary, everything else propagates to the
/// immediate caller as a typed failure.
#[derive(Debug, Error)]
pub enum ConfabError {
    /// Configuration errors (invalid TOML, missing required fields, bad tunables).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable event store errors (query failure, write failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A store operation exceeded its bounded deadline.
    #[error("store operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Malformed action payload, invalid enum value, or missing required field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller is not a participant of the conversation.
    #[error("user {user_id} cannot access conversation {conversation_id}")]
    Forbidden {
        user_id: String,
        conversation_id: String,
    },

    /// A referenced message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(String),

    /// The client-side of a stream is gone (disconnect, closed response channel).
    #[error("transport closed: {0}")]
    Transport(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConfabError {
    /// Whether this error is a transient infrastructure failure that the
    /// polling loop may absorb and retry on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConfabError::Store { .. } | ConfabError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        let store = ConfabError::Store {
            source: Box::new(std::io::Error::other("boom")),
        };
        let timeout = ConfabError::Timeout {
            duration: std::time::Duration::from_millis(500),
        };
        assert!(store.is_transient());
        assert!(timeout.is_transient());

        let forbidden = ConfabError::Forbidden {
            user_id: "u1".into(),
            conversation_id: "c1".into(),
        };
        assert!(!forbidden.is_transient());
        assert!(!ConfabError::MessageNotFound("m1".into()).is_transient());
        assert!(!ConfabError::InvalidInput("bad action".into()).is_transient());
        assert!(!ConfabError::Transport("stream closed".into()).is_transient());
    }

    #[test]
    fn display_carries_context() {
        let err = ConfabError::Forbidden {
            user_id: "u1".into(),
            conversation_id: "c9".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("u1"));
        assert!(rendered.contains("c9"));
    }
}
