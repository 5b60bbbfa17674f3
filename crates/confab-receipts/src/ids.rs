// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic document ids for receipts and reactions.
//!
//! The id is a pure function of the constituent keys, which makes writes
//! idempotent without distributed locks: a duplicate client retry computes
//! the same id and overwrites instead of duplicating.

use sha2::{Digest, Sha256};

/// Receipt id for `(message_id, user_id)`.
pub fn receipt_id(message_id: &str, user_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(user_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Reaction id for `(message_id, user_id, emoji)`.
pub fn reaction_id(message_id: &str, user_id: &str, emoji: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(user_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(emoji.as_bytes());
    hex::encode(hasher.finalize())
}
