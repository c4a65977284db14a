//! HTTP-Handler fuer Raum-Abfragen

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::error::fehler_antwort;
use crate::state::ApiState;

/// GET /rooms/:name – Raum samt aktueller Teilnehmerliste
pub async fn get_raum(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    match state.raum_dienst.finde_nach_name(&name).await {
        Ok(Some(gefunden)) => (
            StatusCode::OK,
            Json(json!({
                "id": gefunden.raum.id,
                "name": gefunden.raum.name,
                "created_at": gefunden.raum.created_at,
                "participants": gefunden.teilnehmer,
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Raum nicht gefunden: {name}") })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}
