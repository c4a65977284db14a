//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Dienst-Schicht von der konkreten
//! Datenbank-Implementierung. Die Traits verwenden `async fn` ohne
//! Send-Garantie (async_fn_in_trait); der Server betreibt die Dienste
//! entsprechend in lokalen Tasks.

use uuid::Uuid;

use crate::error::DbError;
use crate::models::{AnrufRecord, NeuerAnruf, RaumRecord, TeilnehmerRecord};

/// Result-Alias fuer Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://funkraum.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://funkraum.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Raum-Datenzugriffe
#[allow(async_fn_in_trait)]
pub trait RaumRepository: Send + Sync {
    /// Einen Raum anhand seines Namens laden (exakte Uebereinstimmung,
    /// case-sensitiv, keine Normalisierung)
    async fn get_by_name(&self, name: &str) -> DbResult<Option<RaumRecord>>;

    /// Einen Raum anhand seiner ID laden
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<RaumRecord>>;

    /// Idempotentes Get-or-Create: legt den Raum an falls er fehlt.
    ///
    /// Gleichzeitige Aufrufe fuer denselben neuen Namen duerfen keine
    /// Duplikate erzeugen; der UNIQUE-Constraint auf `name` serialisiert
    /// den Anlege-Pfad.
    async fn ensure(&self, name: &str) -> DbResult<RaumRecord>;
}

/// Repository fuer Teilnehmer-Datenzugriffe
#[allow(async_fn_in_trait)]
pub trait TeilnehmerRepository: Send + Sync {
    /// Mitgliedschaft anlegen. Idempotent: ein doppelter Join derselben
    /// Verbindung in denselben Raum erzeugt keine zweite Zeile.
    async fn add(&self, connection_id: &str, room_id: Uuid) -> DbResult<TeilnehmerRecord>;

    /// Alle Teilnehmer eines Raums laden
    async fn list_for_room(&self, room_id: Uuid) -> DbResult<Vec<TeilnehmerRecord>>;

    /// Alle Mitgliedschaften einer Verbindung entfernen (Disconnect).
    /// Gibt die Anzahl entfernter Zeilen zurueck.
    async fn remove_by_connection(&self, connection_id: &str) -> DbResult<u64>;

    /// Mitgliedschaft einer Verbindung in einem bestimmten Raum entfernen
    async fn remove_from_room(&self, connection_id: &str, room_id: Uuid) -> DbResult<bool>;
}

/// Repository fuer Anruf-Datenzugriffe
#[allow(async_fn_in_trait)]
pub trait AnrufRepository: Send + Sync {
    /// Neuen Anruf persistieren (ended_at NULL, duration 0, kein Audio)
    async fn create(&self, data: NeuerAnruf<'_>) -> DbResult<AnrufRecord>;

    /// Anruf anhand seiner ID laden
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AnrufRecord>>;

    /// Den aktiven Anruf eines Raums laden (ended_at IS NULL)
    async fn get_active_for_room(&self, room_id: Uuid) -> DbResult<Option<AnrufRecord>>;

    /// Anruf als beendet markieren. Atomar: nur eine noch offene Zeile
    /// wird markiert. Gibt false zurueck wenn die Zeile nicht existiert
    /// oder bereits beendet ist.
    async fn mark_ended(
        &self,
        id: Uuid,
        ended_at: chrono::DateTime<chrono::Utc>,
        duration_secs: f64,
    ) -> DbResult<bool>;

    /// Einen Audio-Chunk anhaengen. Die Sequenznummer wird fortlaufend
    /// vergeben; der Aufrufer serialisiert Appends pro Anruf.
    async fn append_audio_chunk(&self, call_id: Uuid, data: &[u8]) -> DbResult<()>;

    /// Die Gesamtaufnahme eines Anrufs zusammensetzen.
    /// `None` wenn kein einziger Chunk gespeichert wurde.
    async fn load_audio(&self, call_id: Uuid) -> DbResult<Option<Vec<u8>>>;
}
