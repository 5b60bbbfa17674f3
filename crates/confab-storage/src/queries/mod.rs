// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the serialized connection.

pub mod events;
pub mod messages;
pub mod receipts;
pub mod typing;
