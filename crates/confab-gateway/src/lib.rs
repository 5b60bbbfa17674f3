// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Confab event delivery service.
//!
//! Exposes the per-conversation SSE stream endpoint and the typing, receipt,
//! and reaction action endpoints behind bearer auth and the participant
//! check.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod sse;

pub use auth::{AuthConfig, TrustedUpstream};
pub use server::{GatewayState, HealthState, ServerConfig, start_server};
