use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use chatdraw_sdk::objects::FeedMessage;
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// `GET /ws` — viewer feed.
///
/// Upgrades the HTTP connection to a WebSocket and pushes [`FeedMessage`]
/// JSON frames. The buffered chat history comes first, then the current
/// roster, then live chat lines and roster changes.
pub async fn feed_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_feed_ws(socket, state))
}

/// Background task that drives a single viewer connection.
async fn handle_feed_ws(mut socket: WebSocket, state: AppState) {
    let (snapshot, mut feed_rx) = match state.coordinator.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::warn!(error = %e, "WS: coordinator unavailable, closing viewer");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    for frame in snapshot.into_messages() {
        if send_json(&mut socket, &frame).await.is_err() {
            return;
        }
    }
    tracing::debug!("WS: viewer connected");

    loop {
        tokio::select! {
            result = feed_rx.recv() => {
                match result {
                    Ok(frame) => {
                        if send_json(&mut socket, &frame).await.is_err() {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "WS: viewer lagged, resending roster");
                        let Ok(participants) = state.coordinator.roster().await else {
                            break;
                        };
                        let frame = FeedMessage::Participants { participants };
                        if send_json(&mut socket, &frame).await.is_err() {
                            return;
                        }
                    }
                    Err(RecvError::Closed) => {
                        break;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                        tracing::debug!("WS: viewer disconnected");
                        return;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
