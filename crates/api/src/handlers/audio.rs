//! HTTP-Handler fuer Audio-Endpunkte
//!
//! Der Upload nimmt Multipart-Formulare mit den Feldern `callId` (Text)
//! und `audio` (Binaerdaten) an und haengt den Chunk an die Aufnahme des
//! Anrufs an. Download und Play liefern die zusammengesetzte Aufnahme,
//! unterschieden nur durch die Content-Disposition.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use serde_json::json;
use uuid::Uuid;

use crate::error::{fehler_antwort, ungueltige_anfrage};
use crate::state::ApiState;

/// POST /audio/upload
pub async fn upload_audio(State(state): State<ApiState>, mut multipart: Multipart) -> Response {
    let mut call_id: Option<String> = None;
    let mut audio: Option<Bytes> = None;

    loop {
        let feld = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(fehler = %e, "Ungueltiges Multipart-Formular");
                return ungueltige_anfrage("Ungueltiges Multipart-Formular");
            }
        };

        match feld.name() {
            Some("callId") => match feld.text().await {
                Ok(text) => call_id = Some(text),
                Err(_) => return ungueltige_anfrage("Feld 'callId' ist nicht lesbar"),
            },
            Some("audio") => match feld.bytes().await {
                Ok(bytes) => audio = Some(bytes),
                Err(_) => return ungueltige_anfrage("Feld 'audio' ist nicht lesbar"),
            },
            _ => {
                // Unbekannte Felder werden ignoriert
            }
        }
    }

    let call_id = match call_id {
        Some(c) => c,
        None => return ungueltige_anfrage("Feld 'callId' fehlt"),
    };
    let audio = match audio {
        Some(a) => a,
        None => return ungueltige_anfrage("Feld 'audio' fehlt"),
    };

    let anruf_id = match Uuid::parse_str(&call_id) {
        Ok(id) => id,
        Err(_) => return ungueltige_anfrage(format!("Ungueltige Anruf-ID: {call_id}")),
    };

    match state.anruf_dienst.audio_anhaengen(anruf_id, &audio).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "Audio gespeichert",
                "callId": anruf_id,
                "bytes": audio.len(),
            })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

/// GET /audio/:call_id/download
pub async fn download_audio(State(state): State<ApiState>, Path(call_id): Path<Uuid>) -> Response {
    audio_antwort(&state, call_id, "attachment").await
}

/// GET /audio/:call_id/play
pub async fn play_audio(State(state): State<ApiState>, Path(call_id): Path<Uuid>) -> Response {
    audio_antwort(&state, call_id, "inline").await
}

/// Liefert die zusammengesetzte Aufnahme mit der gewuenschten Disposition
async fn audio_antwort(state: &ApiState, call_id: Uuid, disposition: &str) -> Response {
    let audio = match state.anruf_dienst.audio_laden(call_id).await {
        Ok(bytes) => bytes,
        Err(e) => return fehler_antwort(e),
    };

    let headers = [
        (header::CONTENT_TYPE, "audio/webm".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"call-{call_id}.webm\""),
        ),
    ];

    (StatusCode::OK, headers, audio).into_response()
}
