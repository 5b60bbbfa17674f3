// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Receipt recording and reaction toggling.
//!
//! Both components write documents keyed by a deterministic id derived from
//! their constituent keys, making every client retry idempotent.

pub mod ids;
pub mod recorder;
pub mod toggle;

pub use ids::{reaction_id, receipt_id};
pub use recorder::{ReceiptAck, ReceiptRecorder};
pub use toggle::{ReactionToggle, ToggleOutcome};
