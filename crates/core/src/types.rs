//! Gemeinsame Identifikationstypen fuer Funkraum
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.
//!
//! Die `VerbindungsId` wird vom Transport beim Accept vergeben und ist der
//! Adressierungs-Schluessel fuer Unicast-Relay. Auf dem Draht wird sie als
//! einfacher UUID-String serialisiert, damit Clients sie opak durchreichen
//! koennen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Raum-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaumId(pub Uuid);

impl RaumId {
    /// Erstellt eine neue zufaellige RaumId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for RaumId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RaumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raum:{}", self.0)
    }
}

/// Eindeutige Anruf-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnrufId(pub Uuid);

impl AnrufId {
    /// Erstellt eine neue zufaellige AnrufId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }

    /// Parst eine AnrufId aus ihrer String-Darstellung
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl std::fmt::Display for AnrufId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vom Transport vergebene Verbindungs-ID (eine pro lebender Verbindung)
///
/// Clients kennen nur den String; serverseitig bleibt der Typ stark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerbindungsId(pub Uuid);

impl VerbindungsId {
    /// Vergibt eine neue zufaellige VerbindungsId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }

    /// Parst eine VerbindungsId aus ihrer String-Darstellung
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for VerbindungsId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
