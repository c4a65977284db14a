//! Route-Definitionen fuer die HTTP-Schnittstelle

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::ApiState;

/// Erstellt den vollstaendigen Router
pub fn router() -> Router<ApiState> {
    Router::new()
        // Audio
        .route("/audio/upload", post(handlers::audio::upload_audio))
        .route(
            "/audio/:call_id/download",
            get(handlers::audio::download_audio),
        )
        .route("/audio/:call_id/play", get(handlers::audio::play_audio))
        // Raeume
        .route("/rooms/:name", get(handlers::raeume::get_raum))
        // Health
        .route("/health", get(crate::server::health))
}
