// Composition root for the healthcare platform.
//
// Responsibilities:
// - Read config from environment.
// - Instantiate concrete infrastructure implementations.
// - Mount the auth, patient and admin route groups behind one CORS policy.
// - Wrap the HTTP app with the real-time transport so both share a listener.
// - Run the schema startup hook before accepting traffic.

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod http;
pub mod realtime;
pub mod startup;
pub mod state;

use crate::shell::state::AppState;

/// The full application. Socket.IO traffic is claimed first, everything else
/// falls through to the HTTP app. CORS and tracing cover both.
pub fn build_app(state: AppState) -> Router {
    let socket_manager = state.socket_manager.clone();
    let cors = http::cors_layer(&state.settings);
    let realtime_path = state.settings.realtime_path.clone();
    realtime::wrap(socket_manager, http::router(state), &realtime_path)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
