use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::constants::STREAM_OUTBOUND_BUFFER;
use crate::pipeline::stream::{spawn_frame_worker, ClientMessage, FramePayload, ServerMessage};
use crate::response::AppError;
use crate::state::AppState;

static STREAM_CONNECTION_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Headroom over the frame limit so a slightly oversized frame gets an
/// error message instead of a dropped connection.
const MESSAGE_SLACK_BYTES: usize = 64 * 1024;

struct StreamGuard;

impl StreamGuard {
    fn acquire(max: usize) -> Option<Self> {
        let current = STREAM_CONNECTION_COUNT.fetch_add(1, Ordering::SeqCst);
        if current >= max {
            STREAM_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(StreamGuard)
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        STREAM_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(stream_handler))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamQuery {
    target_pose: Option<String>,
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    state
        .pipeline()
        .resolve_target(query.target_pose.as_deref())?;

    let guard = StreamGuard::acquire(state.config().stream.max_connections)
        .ok_or_else(|| AppError::too_many_requests("Too many stream connections"))?;

    let max_message = state.pipeline().max_frame_bytes() + MESSAGE_SLACK_BYTES;
    Ok(ws
        .max_message_size(max_message)
        .on_upgrade(move |socket| run_stream(socket, state, query.target_pose, guard)))
}

async fn run_stream(
    socket: WebSocket,
    state: AppState,
    mut target: Option<String>,
    _guard: StreamGuard,
) {
    tracing::info!(
        active = STREAM_CONNECTION_COUNT.load(Ordering::SeqCst),
        target = target.as_deref().unwrap_or("-"),
        "stream opened"
    );

    let (mut sink, mut incoming) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(STREAM_OUTBOUND_BUFFER);
    let (mut mailbox, worker) = spawn_frame_worker(state.pipeline().clone(), out_tx.clone());
    let mut shutdown_rx = state.shutdown_rx();

    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode stream message");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            next = incoming.next() => {
                let message = match next {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "stream read failed");
                        break;
                    }
                    None => break,
                };
                match message {
                    Message::Binary(data) => {
                        mailbox.submit(FramePayload::Image(Bytes::from(data)), target.clone());
                    }
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Target { target_pose }) => {
                            match state.pipeline().resolve_target(target_pose.as_deref()) {
                                Ok(_) => target = target_pose,
                                Err(e) => {
                                    let _ = out_tx.send(ServerMessage::error(e.to_string())).await;
                                }
                            }
                        }
                        Ok(ClientMessage::Landmarks { landmarks, target_pose }) => {
                            let frame_target = target_pose.or_else(|| target.clone());
                            mailbox.submit(FramePayload::Landmarks(landmarks), frame_target);
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "malformed stream control message");
                            let _ = out_tx
                                .send(ServerMessage::error("Malformed control message"))
                                .await;
                        }
                    },
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            _ = shutdown_rx.recv() => {
                tracing::debug!("stream closing for shutdown");
                break;
            }
        }
    }

    drop(mailbox);
    let stats = worker.await.unwrap_or_default();
    drop(out_tx);
    let _ = writer.await;

    tracing::info!(
        processed = stats.processed,
        skipped = stats.skipped,
        "stream closed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_caps_and_releases_connections() {
        // Other tests never hold guards, so the counter starts at zero here.
        let first = StreamGuard::acquire(2).unwrap();
        let second = StreamGuard::acquire(2).unwrap();
        assert!(StreamGuard::acquire(2).is_none());

        drop(first);
        let third = StreamGuard::acquire(2);
        assert!(third.is_some());

        drop(second);
        drop(third);
        assert_eq!(STREAM_CONNECTION_COUNT.load(Ordering::SeqCst), 0);
    }
}
