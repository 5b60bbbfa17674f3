// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Confab event delivery service.
//!
//! This crate provides the error taxonomy, the domain types shared across the
//! workspace, and the narrow traits through which Confab consumes its external
//! collaborators (the durable event store and the conversation authorizer).

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConfabError;
pub use traits::{ConversationAuthorizer, EventStore};
pub use types::{Event, EventKind, Receipt, ReceiptStatus, StoredMessage, TypingIndicator};
