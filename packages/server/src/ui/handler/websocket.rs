//! `/ws/chat` relay.
//!
//! Each socket gets a session; `ENTER`, `TALK` and `CLOSE` frames are routed
//! to the matching use case and broadcasts reach the socket through its
//! MessagePusher channel.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use barcart_shared::protocol::{ChatFrame, FrameType};

use crate::{domain::SessionId, ui::state::AppState, usecase::EnterRoomError};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards pushed messages to the WebSocket sink.
///
/// A frame on `close_rx` is sent as the final Close frame. The task ends when
/// the session is unregistered from the MessagePusher or the sink fails.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut close_rx: mpsc::Receiver<CloseFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                Some(frame) = close_rx.recv() => {
                    let _ = sender.send(Message::Close(Some(frame))).await;
                    break;
                }
                else => break,
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (close_tx, close_rx) = mpsc::channel(1);
    let session_id = state.connect_session_usecase.execute(tx).await;

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(rx, close_rx, sender);
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        session_id,
        close_tx,
    ));

    let send_finished = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => {
            recv_task.abort();
            true
        }
    };

    state.disconnect_session_usecase.execute(&session_id).await;
    // Unregistering closes the pusher channel, so the pending Close frame
    // (if any) is flushed before the send task ends.
    if !send_finished {
        let _ = send_task.await;
    }
}

async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    session_id: SessionId,
    close_tx: mpsc::Sender<CloseFrame>,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on session '{}': {}", session_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                let frame = match serde_json::from_str::<ChatFrame>(text.as_str()) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!("Ignoring malformed frame from '{}': {}", session_id, e);
                        continue;
                    }
                };
                if let Some(close) = handle_frame(&state, session_id, frame).await {
                    let _ = close_tx.send(close).await;
                    break;
                }
            }
            Message::Close(_) => {
                tracing::info!("Session '{}' requested close", session_id);
                break;
            }
            _ => {}
        }
    }
}

/// Route one frame. Returns the Close frame to send when the socket must end.
async fn handle_frame(
    state: &AppState,
    session_id: SessionId,
    frame: ChatFrame,
) -> Option<CloseFrame> {
    match frame.r#type {
        FrameType::Enter => {
            let result = state
                .enter_room_usecase
                .execute(session_id, &frame.room_id, frame.member_id)
                .await;
            match result {
                Ok(()) => None,
                Err(EnterRoomError::RoomFull(room_id)) => {
                    tracing::info!("Refusing ENTER into full room {}", room_id);
                    Some(CloseFrame {
                        code: close_code::POLICY,
                        reason: Utf8Bytes::from_static("room is full"),
                    })
                }
                Err(EnterRoomError::RoomNotFound(room_id)) => {
                    tracing::info!("Refusing ENTER into unknown room {}", room_id);
                    Some(CloseFrame {
                        code: close_code::POLICY,
                        reason: Utf8Bytes::from_static("room not found"),
                    })
                }
            }
        }
        FrameType::Talk => {
            if let Err(e) = state.send_message_usecase.execute(&session_id, frame).await {
                tracing::warn!("Dropping TALK from '{}': {}", session_id, e);
            }
            None
        }
        FrameType::Close => {
            state
                .leave_room_usecase
                .execute(&session_id, &frame.room_id)
                .await;
            None
        }
    }
}
