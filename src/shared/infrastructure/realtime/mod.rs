// Real-time messaging layer.
//
// A single `SocketManager` is created at boot and cloned into every route
// group that needs to notify connected dashboards. Fan-out is a tokio
// broadcast channel; each Socket.IO connection owns one receiver.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub mod socketio;

pub const CHANNEL_CAPACITY: usize = 256;

/// One broadcast message. Sent to clients as the Socket.IO event
/// `42["<event>",<data>]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RealtimeEvent {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

struct Inner {
    sender: broadcast::Sender<RealtimeEvent>,
    connections: AtomicUsize,
}

#[derive(Clone)]
pub struct SocketManager {
    inner: Arc<Inner>,
}

impl Default for SocketManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketManager {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                sender,
                connections: AtomicUsize::new(0),
            }),
        }
    }

    /// Publishes `event` to every connected client and returns how many
    /// sessions received it. No listeners is not an error.
    pub fn emit(&self, event: &str, data: impl Serialize) -> usize {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                warn!(event, error = %e, "dropping unserializable realtime payload");
                return 0;
            }
        };
        match self.inner.sender.send(RealtimeEvent::new(event, data)) {
            Ok(receivers) => {
                debug!(event, receivers, "realtime event emitted");
                receivers
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.inner.sender.subscribe()
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.load(Ordering::SeqCst)
    }

    /// Counts a live session until the returned guard is dropped.
    pub fn track_connection(&self) -> ConnectionGuard {
        self.inner.connections.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            manager: self.clone(),
        }
    }
}

pub struct ConnectionGuard {
    manager: SocketManager,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager
            .inner
            .connections
            .fetch_sub(1, Ordering::SeqCst);
    }
}
