// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the action endpoints.
//!
//! Handles POST /v1/conversations/{id}/typing, POST /v1/receipts,
//! POST /v1/reactions, and GET /health.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use confab_core::{ConfabError, ReceiptStatus};
use serde::{Deserialize, Serialize};

use crate::auth::authed_user;
use crate::server::GatewayState;

/// Typing action carried by the typing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypingAction {
    Start,
    Stop,
}

/// Request body for POST /v1/conversations/{id}/typing.
#[derive(Debug, Deserialize)]
pub struct TypingRequest {
    /// "start" or "stop"; any other value is rejected at deserialization.
    pub action: TypingAction,
}

/// Request body for POST /v1/receipts.
#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    pub message_id: String,
    /// "delivered", "read", or "failed".
    pub status: ReceiptStatus,
}

/// Request body for POST /v1/reactions.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub message_id: String,
    pub emoji: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a component error onto the gateway's status codes.
pub fn error_to_response(err: ConfabError) -> Response {
    let status = match &err {
        ConfabError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ConfabError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ConfabError::MessageNotFound(_) => StatusCode::NOT_FOUND,
        ConfabError::Store { .. } | ConfabError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ConfabError::Config(_) | ConfabError::Transport(_) | ConfabError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// 401 for requests missing the upstream identity header.
pub fn missing_identity() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "missing x-confab-user identity".to_string(),
        }),
    )
        .into_response()
}

/// GET /health
///
/// Public liveness endpoint for process supervisors.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/conversations/{id}/typing
///
/// Records a typing start/stop for the authenticated participant.
pub async fn post_typing(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TypingRequest>,
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

    let is_typing = body.action == TypingAction::Start;
    match state.typing.set_typing(&conversation_id, &user_id, is_typing).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => error_to_response(e),
    }
}

/// POST /v1/receipts
///
/// Records a delivery/read/failed receipt for the authenticated user. A
/// receipt for an unresolvable message is still recorded (without the
/// denormalized conversation), so the participant check only applies when
/// the message is known.
pub async fn post_receipt(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(body): Json<ReceiptRequest>,
) -> Response {
    let Some(user_id) = authed_user(&headers) else {
        return missing_identity();
    };

    if let Ok(Some(message)) = state.store.get_message(&body.message_id).await {
        match state
            .authorizer
            .can_access_conversation(&user_id, &message.conversation_id)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return error_to_response(ConfabError::Forbidden {
                    user_id,
                    conversation_id: message.conversation_id,
                });
            }
            Err(e) => return error_to_response(e),
        }
    }

    match state
        .receipts
        .record(&body.message_id, &user_id, body.status)
        .await
    {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => error_to_response(e),
    }
}

/// POST /v1/reactions
///
/// Toggles an emoji reaction and reports which side of the toggle occurred.
pub async fn post_reaction(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(body): Json<ReactionRequest>,
) -> Response {
    let Some(user_id) = authed_user(&headers) else {
        return missing_identity();
    };

    let message = match state.store.get_message(&body.message_id).await {
        Ok(Some(message)) => message,
        Ok(None) => {
            return error_to_response(ConfabError::MessageNotFound(body.message_id));
        }
        Err(e) => return error_to_response(e),
    };

    match state
        .authorizer
        .can_access_conversation(&user_id, &message.conversation_id)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            return error_to_response(ConfabError::Forbidden {
                user_id,
                conversation_id: message.conversation_id,
            });
        }
        Err(e) => return error_to_response(e),
    }

    match state
        .reactions
        .toggle(&body.message_id, &user_id, &body.emoji)
        .await
    {
        Ok(outcome) => {
            let body = if outcome.added() {
                serde_json::json!({"added": true})
            } else {
                serde_json::json!({"removed": true})
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_request_accepts_start_and_stop() {
        let req: TypingRequest = serde_json::from_str(r#"{"action": "start"}"#).unwrap();
        assert_eq!(req.action, TypingAction::Start);

        let req: TypingRequest = serde_json::from_str(r#"{"action": "stop"}"#).unwrap();
        assert_eq!(req.action, TypingAction::Stop);
    }

    #[test]
    fn typing_request_rejects_invalid_action() {
        let result = serde_json::from_str::<TypingRequest>(r#"{"action": "pause"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn receipt_request_parses_status_enum() {
        let req: ReceiptRequest =
            serde_json::from_str(r#"{"message_id": "m1", "status": "read"}"#).unwrap();
        assert_eq!(req.status, ReceiptStatus::Read);

        let result =
            serde_json::from_str::<ReceiptRequest>(r#"{"message_id": "m1", "status": "seen"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn reaction_request_requires_both_fields() {
        let req: ReactionRequest =
            serde_json::from_str(r#"{"message_id": "m1", "emoji": "👍"}"#).unwrap();
        assert_eq!(req.emoji, "👍");

        let result = serde_json::from_str::<ReactionRequest>(r#"{"message_id": "m1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn error_mapping_follows_the_taxonomy() {
        use axum::http::StatusCode;

        let cases = [
            (
                ConfabError::InvalidInput("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ConfabError::Forbidden {
                    user_id: "u".into(),
                    conversation_id: "c".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                ConfabError::MessageNotFound("m".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ConfabError::Store {
                    source: "down".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ConfabError::Timeout {
                    duration: std::time::Duration::from_secs(5),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ConfabError::Internal("bug".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(error_to_response(err).status(), expected);
        }
    }
}
