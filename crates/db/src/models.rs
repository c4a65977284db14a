//! Datenbankmodelle fuer Funkraum
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Domain-Typen getrennt und dienen als reine
//! Datenuebertragungsobjekte. Verbindungs-IDs werden als opake Strings
//! gefuehrt, so wie der Transport sie vergibt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Raeume
// ---------------------------------------------------------------------------

/// Raum-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaumRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Teilnehmer
// ---------------------------------------------------------------------------

/// Teilnehmer-Datensatz: eine lebende Mitgliedschaft einer Verbindung
/// in einem Raum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeilnehmerRecord {
    pub id: Uuid,
    pub connection_id: String,
    pub room_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Anrufe
// ---------------------------------------------------------------------------

/// Anruf-Datensatz: eine Sprachsitzung zwischen genau zwei Verbindungen
///
/// `transcript` ist fuer spaetere Transkription reserviert und wird von
/// diesem Kern nie befuellt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnrufRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub caller_id: String,
    pub receiver_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: f64,
    pub transcript: Option<String>,
}

impl AnrufRecord {
    /// Gibt true zurueck wenn der Anruf noch nicht beendet wurde
    pub fn ist_aktiv(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Daten zum Erstellen eines neuen Anrufs
#[derive(Debug, Clone)]
pub struct NeuerAnruf<'a> {
    pub id: Uuid,
    pub room_id: Uuid,
    pub caller_id: &'a str,
    pub receiver_id: &'a str,
}
