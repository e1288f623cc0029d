// Socket.IO transport for the real-time layer.
//
// socketioxide speaks Engine.IO v4 (polling and websocket) and answers the
// namespace `connect` packet itself. Each connected socket gets a forwarding
// task that relays `SocketManager` broadcasts as `42["event",data]` packets
// until the client disconnects.

use serde_json::Value;
use socketioxide::{SocketIo, extract::SocketRef, layer::SocketIoLayer};
use std::sync::Arc;
use tokio::sync::{Notify, broadcast::error::RecvError};
use tracing::{debug, info, warn};

use crate::shared::infrastructure::realtime::SocketManager;

pub const PING_EVENT: &str = "ping";
pub const PONG_EVENT: &str = "pong";

/// Builds the tower layer serving Socket.IO under `path` and wires the
/// default namespace to `manager`.
pub fn layer(manager: SocketManager, path: &str) -> SocketIoLayer {
    let (layer, io) = SocketIo::builder()
        .req_path(path.trim_end_matches('/').to_string())
        .build_layer();

    io.ns("/", move |socket: SocketRef| on_connect(socket, manager.clone()));
    layer
}

fn on_connect(socket: SocketRef, manager: SocketManager) {
    let sid = socket.id;
    let mut events = manager.subscribe();
    let guard = manager.track_connection();
    info!(%sid, connections = manager.connection_count(), "realtime client connected");

    socket.on(PING_EVENT, |socket: SocketRef| {
        if let Err(e) = socket.emit(PONG_EVENT.to_string(), &Value::Null) {
            debug!(sid = %socket.id, error = %e, "pong not delivered");
        }
    });

    let closed = Arc::new(Notify::new());
    let on_close = closed.clone();
    socket.on_disconnect(move |socket: SocketRef| {
        info!(sid = %socket.id, "realtime client disconnected");
        on_close.notify_one();
    });

    tokio::spawn(async move {
        let _guard = guard;
        loop {
            tokio::select! {
                _ = closed.notified() => break,
                outgoing = events.recv() => match outgoing {
                    Ok(event) => {
                        if let Err(e) = socket.emit(event.event.clone(), &event.data) {
                            debug!(%sid, error = %e, "stopping realtime forwarder");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%sid, skipped, "realtime client lagged behind, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });
}
