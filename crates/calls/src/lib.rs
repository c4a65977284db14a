//! funkraum-calls – Raumverzeichnis, Sitzungs-Register, Anruf-Lebenszyklus
//!
//! Dieses Crate implementiert:
//! - `RaumDienst`: Raeume nachschlagen und bei Bedarf anlegen,
//!   Mitgliedschaften pflegen
//! - `SitzungsRegister`: in-memory Index "Raumname -> aktiver Anruf",
//!   erzwingt hoechstens einen aktiven Anruf pro Raum
//! - `AnrufDienst`: Anrufe starten/beenden, Audio-Chunks seriell pro
//!   Anruf anhaengen, Aufnahme beim Lesen zusammensetzen
//!
//! Der durable Zustand liegt im Entity-Store (`funkraum-db`); das Register
//! ist ein fluechtiger Fast-Path-Cache der Frage "welcher Anruf hat ein
//! leeres Ende-Datum" und startet nach einem Prozess-Neustart leer.

pub mod error;
pub mod registry;
pub mod rooms;
pub mod service;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{CallError, CallResult};
pub use registry::SitzungsRegister;
pub use rooms::{RaumDienst, RaumMitTeilnehmern};
pub use service::AnrufDienst;
