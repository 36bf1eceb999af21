//! HTTP control surface.
//!
//! | Route        | Effect                                   |
//! |--------------|------------------------------------------|
//! | `GET /status`| current state                            |
//! | `GET /wake`  | force the display awake                  |
//! | `GET /sleep` | force the display asleep                 |
//! | `PUT /do`    | `{"command": "wake" \| "sleep"}`          |
//!
//! Every route answers `{"isAwake": 0|1}` with the state after the request.

use crate::bridge::DisplayBridge;
use crate::display::Direction;
use crate::error::{BridgeError, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Body of every successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "isAwake")]
    pub is_awake: u8,
}

impl StatusResponse {
    pub fn new(is_awake: bool) -> Self {
        Self {
            is_awake: u8::from(is_awake),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    #[serde(default)]
    command: Option<String>,
}

/// Parse a `PUT /do` body into a transition.
pub fn parse_command(body: &[u8]) -> Result<Direction> {
    let request: CommandRequest =
        serde_json::from_slice(body).map_err(|_| BridgeError::MissingCommand)?;
    let command = request.command.ok_or(BridgeError::MissingCommand)?;
    Direction::from_str(&command).map_err(|_| BridgeError::BadCommand(command))
}

/// Error response: `{"error": "..."}` with a 4xx for bad input, 5xx otherwise.
pub struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(bridge: Arc<DisplayBridge>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/wake", get(wake))
        .route("/sleep", get(sleep))
        .route("/do", put(do_command))
        .with_state(bridge)
}

/// Bind `bind` and serve until `shutdown` is cancelled.
pub async fn serve(
    bind: String,
    bridge: Arc<DisplayBridge>,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(&bind).await?;
    serve_on(listener, bridge, shutdown).await
}

/// Serve on an already bound listener until `shutdown` is cancelled.
pub async fn serve_on(
    listener: TcpListener,
    bridge: Arc<DisplayBridge>,
    shutdown: CancellationToken,
) -> Result<()> {
    info!("[HTTP] Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(bridge))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("[HTTP] Server stopped");
    Ok(())
}

pub(crate) async fn status(State(bridge): State<Arc<DisplayBridge>>) -> Json<StatusResponse> {
    Json(StatusResponse::new(bridge.is_awake()))
}

pub(crate) async fn wake(State(bridge): State<Arc<DisplayBridge>>) -> Json<StatusResponse> {
    info!("[HTTP] wake requested");
    let transition = bridge.command(Direction::Wake).await;
    Json(StatusResponse::new(transition.is_awake))
}

pub(crate) async fn sleep(State(bridge): State<Arc<DisplayBridge>>) -> Json<StatusResponse> {
    info!("[HTTP] sleep requested");
    let transition = bridge.command(Direction::Sleep).await;
    Json(StatusResponse::new(transition.is_awake))
}

pub(crate) async fn do_command(
    State(bridge): State<Arc<DisplayBridge>>,
    body: Bytes,
) -> std::result::Result<Json<StatusResponse>, ApiError> {
    let direction = parse_command(&body).inspect_err(|e| {
        warn!("[HTTP] Rejected /do request: {}", e);
    })?;
    info!("[HTTP] {} requested via /do", direction);
    let transition = bridge.command(direction).await;
    Ok(Json(StatusResponse::new(transition.is_awake)))
}
