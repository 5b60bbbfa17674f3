// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the Confab durable event store contract.
//!
//! Provides WAL-mode SQLite storage with a single-writer concurrency model
//! via `tokio-rusqlite` and typed query modules for events, typing
//! indicators, receipts, and the message lookup table.

pub mod adapter;
pub mod database;
pub mod queries;

pub use adapter::SqliteEventStore;
pub use database::Database;
