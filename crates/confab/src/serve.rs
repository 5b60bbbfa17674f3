// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `confab serve` command implementation.
//!
//! Assembles the durable store, the in-process bus, the action components,
//! and the gateway, then serves until SIGINT/SIGTERM cancels the shared
//! shutdown token. Every stream session holds a child of that token, so
//! shutdown synchronously closes all open streams.

use std::sync::Arc;
use std::time::Duration;

use confab_bus::EventBus;
use confab_config::model::ConfabConfig;
use confab_core::{ConfabError, EventStore};
use confab_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig, TrustedUpstream};
use confab_presence::{PresenceConfig, TypingTracker};
use confab_receipts::{ReactionToggle, ReceiptRecorder};
use confab_storage::SqliteEventStore;
use confab_stream::SessionConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the `confab serve` command.
pub async fn run_serve(config: ConfabConfig) -> Result<(), ConfabError> {
    init_tracing(&config.service.log_level);

    info!(service = config.service.name.as_str(), "starting confab serve");

    // Fail-closed: refuse to start the gateway with no auth configured.
    if config.gateway.bearer_token.is_none() {
        return Err(ConfabError::Config(
            "gateway.bearer_token is not set; the gateway rejects every request without it"
                .to_string(),
        ));
    }

    // Durable store.
    let sqlite = Arc::new(SqliteEventStore::new(config.storage.clone()));
    sqlite.initialize().await?;
    let store: Arc<dyn EventStore> = sqlite.clone();
    info!(path = config.storage.database_path.as_str(), "event store ready");

    // One bus per process; the reconciler covers cross-instance delivery.
    let bus = Arc::new(EventBus::new(config.bus.capacity));

    let typing = Arc::new(TypingTracker::new(
        store.clone(),
        bus.clone(),
        PresenceConfig {
            staleness_ms: config.presence.staleness_ms,
            refresh_ms: config.presence.refresh_ms,
        },
    ));
    let receipts = Arc::new(ReceiptRecorder::new(store.clone(), bus.clone()));
    let reactions = Arc::new(ReactionToggle::new(store.clone(), bus.clone()));

    let stream_config = SessionConfig {
        heartbeat: Duration::from_millis(config.stream.heartbeat_ms),
        poll_interval: Duration::from_millis(config.stream.poll_ms),
        page_size: config.stream.page_size,
        store_timeout: Duration::from_millis(config.stream.store_timeout_ms),
        ..SessionConfig::default()
    };
    info!(
        heartbeat_ms = config.stream.heartbeat_ms,
        poll_ms = config.stream.poll_ms,
        page_size = config.stream.page_size,
        "stream sessions configured"
    );

    // Install signal handler.
    let cancel = install_signal_handler();

    let state = GatewayState {
        store,
        bus,
        authorizer: Arc::new(TrustedUpstream),
        typing,
        receipts,
        reactions,
        stream_config,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        shutdown: cancel.clone(),
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    confab_gateway::start_server(&server_config, state).await?;

    // Server returned: shutdown was requested. Flush the store.
    sqlite.close().await?;
    info!("confab serve shutdown complete");
    Ok(())
}

/// Install SIGINT/SIGTERM handlers that cancel the returned token.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();

    tokio::spawn(async move {
        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received ctrl-c, shutting down"),
            _ = terminate => info!("received SIGTERM, shutting down"),
        }
        handler_token.cancel();
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // EnvFilter directives do not prefix-match across crate names, so each
    // workspace crate gets its own directive.
    let default_filter = [
        "confab",
        "confab_bus",
        "confab_config",
        "confab_core",
        "confab_gateway",
        "confab_presence",
        "confab_receipts",
        "confab_storage",
        "confab_stream",
    ]
    .iter()
    .map(|target| format!("{target}={log_level}"))
    .collect::<Vec<_>>()
    .join(",");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_filter},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
