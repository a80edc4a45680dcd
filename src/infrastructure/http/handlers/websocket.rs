//! WebSocket Handler
//!
//! `/ws/topic/*` 订阅对应目的地，转发发布的每一帧（JSON 文本）

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::infrastructure::http::state::AppState;

/// 目的地 WebSocket 连接处理
pub async fn topic_websocket_handler(
    ws: WebSocketUpgrade,
    Path(topic): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let destination = destination_of(&topic);
    ws.on_upgrade(move |socket| handle_topic_socket(socket, destination, state))
}

fn destination_of(topic: &str) -> String {
    format!("/topic/{}", topic.trim_start_matches('/'))
}

async fn handle_topic_socket(mut socket: WebSocket, destination: String, state: Arc<AppState>) {
    let mut frames = state.event_publisher.subscribe(&destination);
    tracing::info!(destination = %destination, "WebSocket subscribed");

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    let msg = match serde_json::to_string(&frame) {
                        Ok(json) => Message::Text(json),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize frame");
                            continue;
                        }
                    };
                    if let Err(e) = socket.send(msg).await {
                        tracing::debug!(
                            destination = %destination,
                            error = %e,
                            "Failed to send WebSocket message"
                        );
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        destination = %destination,
                        skipped = skipped,
                        "WebSocket subscriber lagged, frames dropped"
                    );
                }
                Err(RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!(destination = %destination, "WebSocket closed by client");
                    break;
                }
                Some(Err(e)) => {
                    tracing::debug!(destination = %destination, error = %e, "WebSocket error");
                    break;
                }
                // Ping 由 axum 自动回复，其余消息忽略
                Some(Ok(_)) => {}
            },
        }
    }

    drop(frames);
    state.event_publisher.prune();
    tracing::info!(destination = %destination, "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_of() {
        assert_eq!(destination_of("novels/abc/structure"), "/topic/novels/abc/structure");
        assert_eq!(destination_of("/chapters/abc/3"), "/topic/chapters/abc/3");
    }
}
