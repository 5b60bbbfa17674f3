// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-lived push session for one connected client.
//!
//! Each session runs as its own task owning exactly one heartbeat timer, one
//! polling timer, and at most one bus subscription. Frames are emitted in
//! discovery order; the shared cursor guarantees each underlying event
//! reaches the client exactly once regardless of which path observed it
//! first. The session never propagates an error into the transport: an emit
//! failure means the client is gone, and the session tears itself down.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use confab_bus::{BusSubscription, EventBus};
use confab_core::EventStore;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::frame::Frame;
use crate::reconciler::Reconciler;

/// Runtime tunables for a stream session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval between keep-alive comment frames.
    pub heartbeat: Duration,
    /// Interval between durable-store polls.
    pub poll_interval: Duration,
    /// Maximum events fetched per poll.
    pub page_size: usize,
    /// Bound on a single store query.
    pub store_timeout: Duration,
    /// Frame channel capacity between the session task and the transport.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat: Duration::from_millis(15_000),
            poll_interval: Duration::from_millis(1_000),
            page_size: 50,
            store_timeout: Duration::from_millis(5_000),
            channel_capacity: 32,
        }
    }
}

/// Handle for cancelling a running stream session.
///
/// Close is idempotent: the first call wins and the session task releases its
/// bus subscription and timers exactly once on exit. Concurrent closes from a
/// client disconnect and a server shutdown are safe.
#[derive(Clone)]
pub struct SessionHandle {
    cancel: CancellationToken,
    close_requested: Arc<AtomicBool>,
    torn_down: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Request the session to stop. Returns `true` for the call that
    /// initiated the close, `false` for every subsequent call.
    pub fn close(&self) -> bool {
        let first = !self.close_requested.swap(true, Ordering::SeqCst);
        self.cancel.cancel();
        first
    }

    /// Whether a stop has been requested (by either side).
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the session task has finished releasing its resources.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

/// Open a stream session for one authorized client.
///
/// Subscribes to the bus (when one is available in-process) before the task
/// starts, so no published event can slip between open and subscribe. The
/// returned receiver yields framed output beginning with [`Frame::Open`];
/// dropping it disconnects the client and the session tears itself down on
/// its next emit.
///
/// `start_ms` seeds the cursor; reconnecting clients pass the current wall
/// clock and resume from "now".
pub fn open(
    conversation_id: impl Into<String>,
    user_id: impl Into<String>,
    store: Arc<dyn EventStore>,
    bus: Option<&EventBus>,
    config: SessionConfig,
    start_ms: i64,
    cancel: CancellationToken,
) -> (SessionHandle, mpsc::Receiver<Frame>) {
    let conversation_id = conversation_id.into();
    let user_id = user_id.into();

    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let subscription = bus.map(|b| b.subscribe(&conversation_id));
    let reconciler = Reconciler::new(
        store,
        conversation_id.clone(),
        config.page_size,
        config.store_timeout,
    );
    let cursor = Cursor::starting_at(start_ms);

    let handle = SessionHandle {
        cancel: cancel.clone(),
        close_requested: Arc::new(AtomicBool::new(false)),
        torn_down: Arc::new(AtomicBool::new(false)),
    };

    let torn_down = handle.torn_down.clone();
    tokio::spawn(run_session(
        conversation_id,
        user_id,
        reconciler,
        cursor,
        subscription,
        config,
        tx,
        cancel,
        torn_down,
    ));

    (handle, rx)
}

/// The session task: one select loop over heartbeat, poll, bus, and cancel.
#[allow(clippy::too_many_arguments)]
async fn run_session(
    conversation_id: String,
    user_id: String,
    reconciler: Reconciler,
    mut cursor: Cursor,
    mut subscription: Option<BusSubscription>,
    config: SessionConfig,
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
    torn_down: Arc<AtomicBool>,
) {
    debug!(
        conversation_id = conversation_id.as_str(),
        user_id = user_id.as_str(),
        "stream session opened"
    );

    if tx.send(Frame::Open).await.is_err() {
        teardown(&conversation_id, subscription, &cancel, &torn_down);
        return;
    }

    let mut heartbeat = tokio::time::interval(config.heartbeat);
    let mut poll = tokio::time::interval(config.poll_interval);
    // Skip the first immediate tick of both timers.
    heartbeat.tick().await;
    poll.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            _ = heartbeat.tick() => {
                if tx.send(Frame::KeepAlive).await.is_err() {
                    // Client gone; swallow and self-terminate.
                    break;
                }
            }
            _ = poll.tick() => {
                let mut client_gone = false;
                for event in reconciler.poll(&mut cursor).await {
                    if tx.send(Frame::Event(event)).await.is_err() {
                        client_gone = true;
                        break;
                    }
                }
                if client_gone {
                    break;
                }
            }
            published = bus_recv(&mut subscription) => {
                match published {
                    Some(event) => {
                        // Same dedup logic as polled events: when the poll
                        // later re-observes this event, the cursor drops it.
                        if cursor.admit(&event)
                            && tx.send(Frame::Event(event)).await.is_err()
                        {
                            break;
                        }
                    }
                    None => {
                        warn!(
                            conversation_id = conversation_id.as_str(),
                            "bus channel closed; continuing on polling alone"
                        );
                        subscription = None;
                    }
                }
            }
        }
    }

    teardown(&conversation_id, subscription, &cancel, &torn_down);
    debug!(
        conversation_id = conversation_id.as_str(),
        user_id = user_id.as_str(),
        "stream session closed"
    );
}

/// Release the bus subscription and mark the session closed.
///
/// The timers are owned by the task and die with it; the single `torn_down`
/// flip is the "already closed" guard that keeps double-close from
/// double-releasing anything.
fn teardown(
    conversation_id: &str,
    subscription: Option<BusSubscription>,
    cancel: &CancellationToken,
    torn_down: &AtomicBool,
) {
    if torn_down.swap(true, Ordering::SeqCst) {
        return;
    }
    drop(subscription);
    cancel.cancel();
    debug!(conversation_id, "stream session resources released");
}

/// Await the next bus event, or pend forever when no bus is attached.
async fn bus_recv(subscription: &mut Option<BusSubscription>) -> Option<confab_core::Event> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}
