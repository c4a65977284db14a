//! HTTP-Fehlerabbildung
//!
//! Dienst-Fehler werden auf den HTTP-Status abgebildet:
//! nicht gefunden -> 404, Konflikt -> 409, ungueltige Eingabe -> 400,
//! Persistenz -> 500 (generische Meldung, Details nur im Log).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use funkraum_calls::CallError;
use serde_json::json;

/// Setzt einen Dienst-Fehler in eine HTTP-Antwort um
pub fn fehler_antwort(fehler: CallError) -> Response {
    let (status, meldung) = match &fehler {
        CallError::Datenbank(e) => {
            tracing::error!(fehler = %e, "Persistenz-Fehler in der HTTP-Schicht");
            (StatusCode::INTERNAL_SERVER_ERROR, "Interner Fehler".to_string())
        }
        CallError::UngueltigeEingabe(_) => (StatusCode::BAD_REQUEST, fehler.to_string()),
        _ if fehler.ist_nicht_gefunden() => (StatusCode::NOT_FOUND, fehler.to_string()),
        _ if fehler.ist_konflikt() => (StatusCode::CONFLICT, fehler.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, fehler.to_string()),
    };

    (status, Json(json!({ "error": meldung }))).into_response()
}

/// Baut eine 400-Antwort fuer fehlende oder ungueltige Request-Teile
pub fn ungueltige_anfrage(meldung: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": meldung.into() })),
    )
        .into_response()
}
