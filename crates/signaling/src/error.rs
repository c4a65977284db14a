//! Fehlertypen fuer den Relay-Service

use thiserror::Error;

/// Fehlertyp fuer den Relay-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Verbindung wurde getrennt
    #[error("Verbindung getrennt")]
    VerbindungGetrennt,

    /// Protokollfehler (ungueltiges Frame, unbekanntes Ereignis)
    #[error("Protokollfehler: {0}")]
    Protokoll(String),

    /// Senden an Client fehlgeschlagen (Queue geschlossen)
    #[error("Senden fehlgeschlagen")]
    SendFehler,

    /// Interner Fehler
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl SignalingError {
    /// Erstellt einen Protokollfehler
    pub fn protokoll(msg: impl Into<String>) -> Self {
        Self::Protokoll(msg.into())
    }
}

/// Result-Typ fuer den Relay-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
