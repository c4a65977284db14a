//! Fehlertypen fuer Funkraum
//!
//! Zentraler Fehler-Enum der alle moeglichen Fehlerzustaende abdeckt.
//! Untermodule koennen eigene Fehler definieren und via `#[from]` konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Funkraum
pub type Result<T> = std::result::Result<T, FunkraumError>;

/// Alle moeglichen Fehler im Funkraum-System
#[derive(Debug, Error)]
pub enum FunkraumError {
    // --- Ressourcen ---
    #[error("Raum nicht gefunden: {0}")]
    RaumNichtGefunden(String),

    #[error("Anruf nicht gefunden: {0}")]
    AnrufNichtGefunden(String),

    #[error("Keine Audiodaten fuer Anruf: {0}")]
    AudioNichtGefunden(String),

    // --- Konflikte ---
    #[error("Im Raum laeuft bereits ein Anruf: {0}")]
    SitzungBereitsAktiv(String),

    #[error("Anruf wurde bereits beendet: {0}")]
    AnrufBereitsBeendet(String),

    // --- Anfragen ---
    #[error("Ungueltige Anfrage: {0}")]
    UngueltigeAnfrage(String),

    // --- Verbindung & Netzwerk ---
    #[error("Verbindung getrennt: {0}")]
    Getrennt(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl FunkraumError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler ein Konflikt ist (Zustand unveraendert)
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
