//! Integrationstests fuer die HTTP-Schnittstelle
//!
//! Die Tests fahren den Router gegen eine In-Memory-Datenbank und
//! sprechen ihn ueber `tower::ServiceExt::oneshot` an, ohne einen
//! echten Socket zu binden.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use funkraum_api::{router, ApiState};
use funkraum_calls::{AnrufDienst, RaumDienst, SitzungsRegister};
use funkraum_db::models::{AnrufRecord, RaumRecord};
use funkraum_db::SqliteDb;

struct TestUmgebung {
    app: Router,
    raum_dienst: Arc<RaumDienst<SqliteDb>>,
    anruf_dienst: Arc<AnrufDienst<SqliteDb>>,
}

async fn aufbauen() -> TestUmgebung {
    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory-DB konnte nicht geoeffnet werden"),
    );
    let raum_dienst = RaumDienst::neu(db.clone());
    let anruf_dienst = AnrufDienst::neu(db, SitzungsRegister::neu());
    let app = router().with_state(ApiState::neu(raum_dienst.clone(), anruf_dienst.clone()));

    TestUmgebung {
        app,
        raum_dienst,
        anruf_dienst,
    }
}

async fn anruf_anlegen(umgebung: &TestUmgebung) -> (RaumRecord, AnrufRecord) {
    let raum = umgebung
        .raum_dienst
        .sicherstellen("lobby")
        .await
        .expect("Raum anlegen");
    let anruf = umgebung
        .anruf_dienst
        .anruf_starten(&raum, "conn-a", "conn-b")
        .await
        .expect("Anruf starten");
    (raum, anruf)
}

/// Baut einen Multipart-Upload-Request mit den Feldern callId und audio
fn upload_request(call_id: Option<&str>, audio: Option<&[u8]>) -> Request<Body> {
    let grenze = "test-grenze-7f3a";
    let mut body = Vec::new();

    if let Some(id) = call_id {
        body.extend_from_slice(
            format!(
                "--{grenze}\r\nContent-Disposition: form-data; name=\"callId\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(daten) = audio {
        body.extend_from_slice(
            format!(
                "--{grenze}\r\nContent-Disposition: form-data; name=\"audio\"; \
                 filename=\"chunk.webm\"\r\nContent-Type: audio/webm\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(daten);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{grenze}--\r\n").as_bytes());

    Request::post("/audio/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={grenze}"),
        )
        .body(Body::from(body))
        .expect("Request bauen")
}

async fn body_bytes(antwort: axum::response::Response) -> Vec<u8> {
    antwort
        .into_body()
        .collect()
        .await
        .expect("Body lesen")
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn health_antwortet_ok() {
    let umgebung = aufbauen().await;
    let antwort = umgebung
        .app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_und_download_verketten_chunks() {
    let umgebung = aufbauen().await;
    let (_, anruf) = anruf_anlegen(&umgebung).await;
    let id = anruf.id.to_string();

    for chunk in [b"AAA".as_slice(), b"BBB", b"CC"] {
        let antwort = umgebung
            .app
            .clone()
            .oneshot(upload_request(Some(&id), Some(chunk)))
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);
    }

    let antwort = umgebung
        .app
        .oneshot(
            Request::get(format!("/audio/{id}/download"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(antwort.status(), StatusCode::OK);
    assert_eq!(
        antwort.headers()[header::CONTENT_TYPE],
        "audio/webm",
        "Content-Type muss audio/webm sein"
    );
    let disposition = antwort.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(disposition, format!("attachment; filename=\"call-{id}.webm\""));

    assert_eq!(body_bytes(antwort).await, b"AAABBBCC");
}

#[tokio::test]
async fn play_liefert_inline_disposition() {
    let umgebung = aufbauen().await;
    let (_, anruf) = anruf_anlegen(&umgebung).await;
    let id = anruf.id.to_string();

    let antwort = umgebung
        .app
        .clone()
        .oneshot(upload_request(Some(&id), Some(b"xyz")))
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::OK);

    let antwort = umgebung
        .app
        .oneshot(
            Request::get(format!("/audio/{id}/play"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(antwort.status(), StatusCode::OK);
    let disposition = antwort.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("inline;"));
}

#[tokio::test]
async fn upload_ohne_call_id_ist_bad_request() {
    let umgebung = aufbauen().await;
    let antwort = umgebung
        .app
        .oneshot(upload_request(None, Some(b"xyz")))
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_ohne_audio_ist_bad_request() {
    let umgebung = aufbauen().await;
    let (_, anruf) = anruf_anlegen(&umgebung).await;

    let antwort = umgebung
        .app
        .oneshot(upload_request(Some(&anruf.id.to_string()), None))
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_fuer_unbekannten_anruf_ist_not_found() {
    let umgebung = aufbauen().await;
    let antwort = umgebung
        .app
        .oneshot(upload_request(
            Some(&uuid::Uuid::new_v4().to_string()),
            Some(b"xyz"),
        ))
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_fuer_unbekannten_anruf_ist_not_found() {
    let umgebung = aufbauen().await;
    let antwort = umgebung
        .app
        .oneshot(
            Request::get(format!("/audio/{}/download", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_ohne_gespeichertes_audio_ist_not_found() {
    let umgebung = aufbauen().await;
    let (_, anruf) = anruf_anlegen(&umgebung).await;

    let antwort = umgebung
        .app
        .oneshot(
            Request::get(format!("/audio/{}/download", anruf.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn raum_abfrage_liefert_teilnehmer() {
    let umgebung = aufbauen().await;
    let raum = umgebung
        .raum_dienst
        .sicherstellen("lobby")
        .await
        .expect("Raum anlegen");
    umgebung
        .raum_dienst
        .beitreten("conn-a", &raum)
        .await
        .expect("Join");

    let antwort = umgebung
        .app
        .oneshot(Request::get("/rooms/lobby").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(antwort.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(antwort).await).unwrap();
    assert_eq!(json["name"], "lobby");
    assert_eq!(json["participants"].as_array().unwrap().len(), 1);
    assert_eq!(json["participants"][0]["connection_id"], "conn-a");
}

#[tokio::test]
async fn unbekannter_raum_ist_not_found() {
    let umgebung = aufbauen().await;
    let antwort = umgebung
        .app
        .oneshot(
            Request::get("/rooms/gibt-es-nicht")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(antwort.status(), StatusCode::NOT_FOUND);
}
