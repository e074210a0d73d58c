//! WebSocket + REST endpoints for the triage pipeline.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::input::{ContentPart, WorkflowInput};
use crate::notify::{ChannelNotifier, LogNotifier};
use crate::workflow::Orchestrator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the Axum router with the triage WebSocket and REST routes.
pub fn triage_routes(orchestrator: Arc<Orchestrator>) -> Router {
    let state = AppState { orchestrator };

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/api/workflow", post(run_workflow))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(orchestrator: Arc<Orchestrator>, port: u16) -> anyhow::Result<()> {
    let app = triage_routes(orchestrator);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "triage server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "inbox-triage"
    }))
}

// ── REST run ────────────────────────────────────────────────────────────

/// One run request: plain text or explicit content parts, never both.
#[derive(Debug, Deserialize)]
struct RunRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    parts: Option<Vec<ContentPart>>,
}

impl RunRequest {
    fn into_input(self) -> Result<WorkflowInput, WorkflowError> {
        match (self.text, self.parts) {
            (Some(text), None) => WorkflowInput::text(text),
            (None, Some(parts)) => WorkflowInput::parts(parts),
            (Some(_), Some(_)) => Err(WorkflowError::Precondition(
                "provide either text or parts, not both".into(),
            )),
            (None, None) => Err(WorkflowError::Precondition(
                "provide either text or parts".into(),
            )),
        }
    }
}

fn error_response(error: &WorkflowError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match error {
        WorkflowError::Precondition(_) => StatusCode::BAD_REQUEST,
        WorkflowError::Stage { .. } => StatusCode::BAD_GATEWAY,
    };
    let body = serde_json::json!({
        "error": error.to_string(),
        "stage": error.stage().map(|s| s.label()),
    });
    (status, Json(body))
}

async fn run_workflow(
    State(state): State<AppState>,
    Json(body): Json<RunRequest>,
) -> impl IntoResponse {
    let input = match body.into_input() {
        Ok(input) => input,
        Err(e) => return error_response(&e).into_response(),
    };

    match state.orchestrator.run(input, &LogNotifier).await {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!(output))).into_response(),
        Err(e) => {
            warn!(error = %e, "workflow run failed");
            error_response(&e).into_response()
        }
    }
}

// ── WebSocket ───────────────────────────────────────────────────────────

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.orchestrator))
}

async fn handle_socket(mut socket: WebSocket, orchestrator: Arc<Orchestrator>) {
    info!("WebSocket client connected");

    // First text frame carries the run request.
    let request = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<RunRequest>(&text) {
                Ok(request) => break request,
                Err(e) => {
                    debug!(error = %e, "Unrecognized WS message from client");
                    let reply = serde_json::json!({
                        "event": "run_failed",
                        "error": format!("invalid run request: {e}"),
                    });
                    if send_json(&mut socket, &reply).await.is_err() {
                        return;
                    }
                }
            },
            Some(Ok(Message::Ping(data))) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    return;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                info!("WebSocket client disconnected before sending a run request");
                return;
            }
            Some(Err(e)) => {
                warn!(error = %e, "WebSocket error");
                return;
            }
            _ => {}
        }
    };

    let input = match request.into_input() {
        Ok(input) => input,
        Err(e) => {
            let reply = serde_json::json!({"event": "run_failed", "error": e.to_string()});
            let _ = send_json(&mut socket, &reply).await;
            return;
        }
    };

    let (notifier, mut events) = ChannelNotifier::new();
    let mut task = tokio::spawn(async move { orchestrator.run(input, &notifier).await });

    loop {
        tokio::select! {
            // Forward progress events to this client as they arrive
            Some(event) = events.recv() => {
                if send_json(&mut socket, &event).await.is_err() {
                    debug!("Client disconnected during send, run continues detached");
                    return;
                }
            }

            result = &mut task => {
                // Drain anything emitted between the last poll and completion
                while let Ok(event) = events.try_recv() {
                    if send_json(&mut socket, &event).await.is_err() {
                        return;
                    }
                }
                let reply = match result {
                    Ok(Ok(output)) => serde_json::json!({
                        "event": "run_completed",
                        "output": output,
                    }),
                    Ok(Err(e)) => serde_json::json!({
                        "event": "run_failed",
                        "stage": e.stage().map(|s| s.label()),
                        "error": e.to_string(),
                    }),
                    Err(e) => serde_json::json!({
                        "event": "run_failed",
                        "error": format!("run task failed: {e}"),
                    }),
                };
                let _ = send_json(&mut socket, &reply).await;
                break;
            }

            // A disconnect detaches the client; the run itself keeps going.
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected mid-run, run continues detached");
                        return;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("WebSocket connection closed");
}

async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    match serde_json::to_string(value) {
        Ok(json) => socket
            .send(Message::Text(json.into()))
            .await
            .map_err(|_| ()),
        Err(e) => {
            warn!(error = %e, "failed to serialize WS message");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_needs_exactly_one_input_form() {
        let both = RunRequest {
            text: Some("hi".into()),
            parts: Some(vec![]),
        };
        assert!(matches!(
            both.into_input(),
            Err(WorkflowError::Precondition(_))
        ));

        let neither = RunRequest {
            text: None,
            parts: None,
        };
        assert!(matches!(
            neither.into_input(),
            Err(WorkflowError::Precondition(_))
        ));

        let text = RunRequest {
            text: Some("hola".into()),
            parts: None,
        };
        assert!(matches!(
            text.into_input().unwrap(),
            WorkflowInput::Text(_)
        ));
    }

    #[test]
    fn precondition_maps_to_bad_request() {
        let (status, _) = error_response(&WorkflowError::Precondition("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stage_failure_maps_to_bad_gateway() {
        let error = WorkflowError::Stage {
            stage: crate::invoker::StageId::Intent,
            source: crate::error::StageError::Schema(crate::error::SchemaError::Inconsistent(
                "x".into(),
            )),
        };
        let (status, Json(body)) = error_response(&error);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["stage"], "intent");
    }
}
