use axum::Router;

use crate::shared::infrastructure::realtime::{SocketManager, socketio};

/// Serves Socket.IO on `path` in front of `http`. Every other request is
/// handled by `http` untouched.
pub fn wrap(manager: SocketManager, http: Router, path: &str) -> Router {
    http.layer(socketio::layer(manager, path))
}
