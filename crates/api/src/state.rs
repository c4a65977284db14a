//! Axum-State fuer die HTTP-Schnittstelle
//!
//! Die Handler arbeiten auf dem konkreten SQLite-Store; der State wird
//! pro Request geklont und teilt die Dienste ueber Arc.

use std::sync::Arc;

use funkraum_calls::{AnrufDienst, RaumDienst};
use funkraum_db::SqliteDb;

/// Geteilter State der HTTP-Handler
#[derive(Clone)]
pub struct ApiState {
    /// Raumverzeichnis und Mitgliedschaften
    pub raum_dienst: Arc<RaumDienst<SqliteDb>>,
    /// Anruf-Lebenszyklus und Audio-Akkumulator
    pub anruf_dienst: Arc<AnrufDienst<SqliteDb>>,
}

impl ApiState {
    /// Erstellt einen neuen ApiState
    pub fn neu(
        raum_dienst: Arc<RaumDienst<SqliteDb>>,
        anruf_dienst: Arc<AnrufDienst<SqliteDb>>,
    ) -> Self {
        Self {
            raum_dienst,
            anruf_dienst,
        }
    }
}
