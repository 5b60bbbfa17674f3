// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream sessions and cursor reconciliation for Confab.
//!
//! A stream session is the per-client push channel: it discovers conversation
//! events either instantly through the in-process bus or within one polling
//! interval through the durable store, deduplicates the two paths through a
//! single cursor, and frames the result for the transport layer.

pub mod cursor;
pub mod frame;
pub mod reconciler;
pub mod session;

pub use cursor::Cursor;
pub use frame::Frame;
pub use reconciler::Reconciler;
pub use session::{SessionConfig, SessionHandle, open};
