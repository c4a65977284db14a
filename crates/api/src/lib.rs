//! funkraum-api – HTTP-Schnittstelle
//!
//! Dieses Crate stellt die HTTP-Endpunkte des Relays bereit:
//! - `POST /audio/upload` – Audio-Chunk an einen Anruf anhaengen
//! - `GET /audio/:call_id/download` – Gesamtaufnahme als Download
//! - `GET /audio/:call_id/play` – Gesamtaufnahme zum Abspielen
//! - `GET /rooms/:name` – Raum samt Teilnehmerliste
//! - `GET /health` – Health-Check

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

// Bequeme Re-Exporte
pub use routes::router;
pub use server::{RestServer, RestServerKonfig};
pub use state::ApiState;
