// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Confab workspace.
//!
//! Provides in-memory stand-ins for the external collaborators so component
//! and end-to-end tests run without a database or an upstream user service.

pub mod authorizer;
pub mod memory_store;

pub use authorizer::StaticAuthorizer;
pub use memory_store::MemoryEventStore;
