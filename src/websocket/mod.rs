//! WebSocket Handler Module
//!
//! Streams telemetry for one target process per connection. The subscription
//! is dropped as soon as the client goes away, which stops its sampling task.

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, info};

use crate::api::app_state::AppState;

pub fn create_websocket_router() -> Router<AppState> {
    Router::new().route("/ws/monitor/:pid", get(monitor_handler))
}

/// WebSocket handler using Axum's WebSocket support
pub async fn monitor_handler(
    ws: WebSocketUpgrade,
    Path(pid): Path<u32>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| monitor_socket(socket, pid, state))
}

/// Forward telemetry events until the stream ends or the client leaves
async fn monitor_socket(socket: WebSocket, pid: u32, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscription = state.telemetry.subscribe(pid);

    info!("Telemetry WebSocket opened for process {}", pid);

    loop {
        tokio::select! {
            event = subscription.next() => {
                let Some(event) = event else {
                    break;
                };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to encode telemetry event: {}", e);
                        break;
                    }
                };
                if let Err(e) = sender.send(Message::Text(text)).await {
                    debug!("Client for process {} went away: {}", pid, e);
                    break;
                }
                if event.is_terminal() {
                    break;
                }
            }
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Client initiated close for process {}", pid);
                    break;
                }
                Some(Err(e)) => {
                    error!("WebSocket error for process {}: {}", pid, e);
                    break;
                }
                Some(Ok(_)) => {}
            }
        }
    }

    drop(subscription);
    if let Err(e) = sender.send(Message::Close(None)).await {
        debug!("Close frame not delivered for process {}: {}", pid, e);
    }
    info!("Telemetry WebSocket closed for process {}", pid);
}
