// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use confab_bus::EventBus;
use confab_core::{ConfabError, ConversationAuthorizer, EventStore};
use confab_presence::TypingTracker;
use confab_receipts::{ReactionToggle, ReceiptRecorder};
use confab_stream::SessionConfig;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;
use crate::sse;

/// Health state for the unauthenticated liveness endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Durable event store shared across instances.
    pub store: Arc<dyn EventStore>,
    /// Same-instance event bus.
    pub bus: Arc<EventBus>,
    /// Conversation participant check.
    pub authorizer: Arc<dyn ConversationAuthorizer>,
    /// Typing presence tracker.
    pub typing: Arc<TypingTracker>,
    /// Receipt recorder.
    pub receipts: Arc<ReceiptRecorder>,
    /// Reaction toggle.
    pub reactions: Arc<ReactionToggle>,
    /// Tunables handed to each stream session.
    pub stream_config: SessionConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Server-wide shutdown token; sessions get child tokens.
    pub shutdown: CancellationToken,
    /// Health state for the public endpoint.
    pub health: HealthState,
}

/// Gateway server configuration (mirrors GatewayConfig from confab-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves:
/// - GET  /health (public)
/// - GET  /v1/conversations/{id}/stream (with auth)
/// - POST /v1/conversations/{id}/typing (with auth)
/// - POST /v1/receipts (with auth)
/// - POST /v1/reactions (with auth)
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ConfabError> {
    let auth_state = state.auth.clone();
    let shutdown = state.shutdown.clone();

    // Unauthenticated public routes (liveness for process supervisors).
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    // Routes requiring authentication.
    let api_routes = Router::new()
        .route("/v1/conversations/{id}/stream", get(sse::open_stream))
        .route("/v1/conversations/{id}/typing", post(handlers::post_typing))
        .route("/v1/receipts", post(handlers::post_receipt))
        .route("/v1/reactions", post(handlers::post_reaction))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConfabError::Transport(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| ConfabError::Transport(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_bus::EventBus;
    use confab_presence::PresenceConfig;
    use confab_test_utils::{MemoryEventStore, StaticAuthorizer};

    fn make_state() -> GatewayState {
        let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        let bus = Arc::new(EventBus::default());
        GatewayState {
            store: store.clone(),
            bus: bus.clone(),
            authorizer: Arc::new(StaticAuthorizer::new()),
            typing: Arc::new(TypingTracker::new(
                store.clone(),
                bus.clone(),
                PresenceConfig::default(),
            )),
            receipts: Arc::new(ReceiptRecorder::new(store.clone(), bus.clone())),
            reactions: Arc::new(ReactionToggle::new(store, bus)),
            stream_config: SessionConfig::default(),
            auth: AuthConfig { bearer_token: None },
            shutdown: CancellationToken::new(),
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }

    #[test]
    fn gateway_state_is_clone() {
        let state = make_state();
        let _cloned = state.clone();
    }

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8780,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
