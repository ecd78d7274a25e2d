//! Per-auction WebSocket event stream.
//!
//! A client joins an auction's room and receives its `bid:placed` /
//! `auction:updated` frames as JSON text, in commit order. The socket is
//! read-only from the client's side; inbound frames are ignored.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::debug;

use crate::types::AuctionEvent;

pub async fn forward_events(socket: WebSocket, mut rx: broadcast::Receiver<AuctionEvent>) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else { continue };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "stream subscriber lagged");
                }
                // Room pruned after closure — all events delivered.
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = stream.next() => match msg {
                Some(Ok(_)) => {} // ignore client frames
                _ => break,        // client hung up
            },
        }
    }

    let _ = sink.close().await;
}
