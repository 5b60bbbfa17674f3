// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events endpoint for GET /v1/conversations/{id}/stream.
//!
//! SSE frame format:
//! ```text
//! event: open
//! data: {}
//!
//! : keep-alive
//!
//! event: message
//! data: {"id": "...", "conversation_id": "...", ...}
//! ```
//!
//! Keep-alives are driven by the session's own heartbeat timer rather than
//! axum's, so a stalled session is visible to the client as silence.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, Sse},
    },
};
use confab_core::{ConfabError, types::now_ms};
use confab_stream::Frame;
use futures::Stream;
use tracing::debug;

use crate::auth::authed_user;
use crate::handlers::{error_to_response, missing_identity};
use crate::server::GatewayState;

/// GET /v1/conversations/{id}/stream
///
/// Validates the caller is a participant, then hands the connection a stream
/// session. The session owns its own heartbeat and polling; the response
/// stream ends when the client disconnects or the server shuts down, and the
/// client is expected to reconnect with a fresh cursor.
pub async fn open_stream(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(user_id) = authed_user(&headers) else {
        return missing_identity();
    };

    match state
        .authorizer
        .can_access_conversation(&user_id, &conversation_id)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            return error_to_response(ConfabError::Forbidden {
                user_id,
                conversation_id,
            });
        }
        Err(e) => return error_to_response(e),
    }

    debug!(
        conversation_id = conversation_id.as_str(),
        user_id = user_id.as_str(),
        "opening event stream"
    );

    let (_handle, frames) = confab_stream::open(
        conversation_id,
        user_id,
        state.store.clone(),
        Some(state.bus.as_ref()),
        state.stream_config.clone(),
        now_ms(),
        state.shutdown.child_token(),
    );

    Sse::new(frame_stream(frames)).into_response()
}

/// Adapt the session's frame channel into an SSE body stream.
fn frame_stream(
    frames: tokio::sync::mpsc::Receiver<Frame>,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    futures::stream::unfold(frames, |mut rx| async move {
        rx.recv().await.map(|frame| (Ok(frame_to_sse(frame)), rx))
    })
}

/// Render one session frame as an SSE event.
fn frame_to_sse(frame: Frame) -> SseEvent {
    match frame {
        Frame::Open => SseEvent::default().event("open").data("{}"),
        Frame::KeepAlive => SseEvent::default().comment("keep-alive"),
        Frame::Event(event) => {
            let data = serde_json::to_string(&event)
                .unwrap_or_else(|_| r#"{"error":"unserializable event"}"#.to_string());
            SseEvent::default().event(event.kind.to_string()).data(data)
        }
    }
}
