//! Fehlertypen fuer Raum- und Anruf-Dienste

use funkraum_db::DbError;
use thiserror::Error;

/// Fehlertyp fuer Raum- und Anruf-Operationen
#[derive(Debug, Error)]
pub enum CallError {
    /// Raum existiert nicht
    #[error("Raum nicht gefunden: {0}")]
    RaumNichtGefunden(String),

    /// Anruf existiert nicht
    #[error("Anruf nicht gefunden: {0}")]
    AnrufNichtGefunden(String),

    /// Keine Audiodaten fuer diesen Anruf gespeichert
    #[error("Keine Audiodaten fuer Anruf: {0}")]
    AudioNichtGefunden(String),

    /// Im Raum laeuft bereits ein Anruf (Konflikt, Zustand unveraendert)
    #[error("Im Raum laeuft bereits ein Anruf: {0}")]
    SitzungBereitsAktiv(String),

    /// Anruf wurde bereits beendet (Konflikt, keine Neuberechnung)
    #[error("Anruf wurde bereits beendet: {0}")]
    AnrufBereitsBeendet(String),

    /// Pflichtfeld fehlt oder ist leer
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    /// Persistenz-Fehler (transient, Retry liegt beim Aufrufer)
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] DbError),
}

impl CallError {
    /// Gibt true zurueck wenn der Fehler ein Konflikt ist
    pub fn ist_konflikt(&self) -> bool {
        matches!(
            self,
            Self::SitzungBereitsAktiv(_) | Self::AnrufBereitsBeendet(_)
        )
    }

    /// Gibt true zurueck wenn der Fehler "nicht gefunden" bedeutet
    pub fn ist_nicht_gefunden(&self) -> bool {
        matches!(
            self,
            Self::RaumNichtGefunden(_)
                | Self::AnrufNichtGefunden(_)
                | Self::AudioNichtGefunden(_)
        )
    }
}

/// Result-Typ fuer Raum- und Anruf-Operationen
pub type CallResult<T> = Result<T, CallError>;
