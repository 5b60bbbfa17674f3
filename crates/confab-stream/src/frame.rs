// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frames emitted by a stream session.
//!
//! The transport layer renders these as server-sent events:
//! `Open` becomes a reserved `open` frame signalling readiness, `KeepAlive`
//! becomes a comment-only frame with no `data:` line, and `Event` becomes
//! `event: <kind>\ndata: <json>`.

use confab_core::Event;

/// One unit of output on a stream session's push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Synthetic readiness frame emitted once, immediately after open, so the
    /// client can distinguish "connected" from "silent".
    Open,
    /// Heartbeat comment frame; carries no payload.
    KeepAlive,
    /// A discovered conversation event.
    Event(Event),
}

impl Frame {
    /// The SSE event type for this frame, or `None` for comment-only frames.
    pub fn event_type(&self) -> Option<String> {
        match self {
            Frame::Open => Some("open".to_string()),
            Frame::KeepAlive => None,
            Frame::Event(event) => Some(event.kind.to_string()),
        }
    }
}
