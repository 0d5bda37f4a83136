//! Realtime channel: pushes metric and alert events over WebSocket.
//!
//! Each connection is registered with the broadcast hub after the upgrade
//! and served by two halves:
//!   1. a delivery task draining the subscriber queue into the socket,
//!   2. the connection task reading (and discarding) inbound frames until the
//!      client goes away.
//! Whichever half finishes first ends the connection. Both are tracked in
//! `AppState::connections` so shutdown can wait for them.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, StreamExt};
use ids_lib::{DeliveryFault, Subscription};
use tracing::{debug, trace};

use crate::api::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// A failed handshake never reaches the registry.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Taken before the response goes out, held until the connection ends
    let token = state.connections.token();

    ws.on_failed_upgrade(|e| debug!(error = %e, "WebSocket handshake failed"))
        .on_upgrade(move |socket| async move {
            handle_socket(socket, state).await;
            drop(token);
        })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let subscription = state.hub.subscribe().await;
    let id = subscription.id();

    let (sink, mut stream) = socket.split();
    let mut delivery = state
        .connections
        .spawn(deliver(sink, subscription, state.keepalive));

    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    trace!(subscriber_id = id, "Inbound frame ignored");
                }
                Some(Err(e)) => {
                    debug!(subscriber_id = id, error = %e, "WebSocket receive error");
                    break;
                }
            },
            finished = &mut delivery => {
                match finished {
                    Ok(Ok(())) => debug!(subscriber_id = id, "Subscriber queue closed"),
                    Ok(Err(fault)) => {
                        state.hub.drop_subscriber(id, &fault).await;
                    }
                    Err(e) => debug!(subscriber_id = id, error = %e, "Delivery task aborted"),
                }
                break;
            }
        }
    }

    state.hub.unsubscribe(id).await;
    delivery.abort();
}

/// Forward queued events to the socket, pinging on every keepalive tick.
///
/// Every send must complete within one keepalive interval. Returns `Ok` when
/// the hub closed the queue (dropped or shutting down), after sending a
/// Close frame.
async fn deliver<S>(
    mut sink: S,
    mut subscription: Subscription,
    keepalive: Duration,
) -> Result<(), DeliveryFault>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut ticker = tokio::time::interval(keepalive);
    // First tick fires immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    let _ = send_within(&mut sink, Message::Close(None), keepalive).await;
                    return Ok(());
                };
                let frame = serde_json::to_string(&event)
                    .map_err(|e| DeliveryFault::Encode(e.to_string()))?;
                send_within(&mut sink, Message::Text(frame), keepalive).await?;
            }
            _ = ticker.tick() => {
                send_within(&mut sink, Message::Ping(Vec::new()), keepalive).await?;
            }
        }
    }
}

/// Send and flush one frame, failing with `SendTimeout` after `limit`
async fn send_within<S>(sink: &mut S, message: Message, limit: Duration) -> Result<(), DeliveryFault>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match tokio::time::timeout(limit, sink.send(message)).await {
        Ok(sent) => sent.map_err(|e| DeliveryFault::Socket(e.to_string())),
        Err(_) => Err(DeliveryFault::SendTimeout(limit)),
    }
}
