//! Gemeinsamer Server-Zustand fuer den Relay-Service
//!
//! Haelt die geteilten Dienste als Arc-Referenzen, die sicher zwischen
//! tokio-Tasks geteilt werden koennen.

use funkraum_calls::{AnrufDienst, RaumDienst};
use funkraum_db::{AnrufRepository, RaumRepository, TeilnehmerRepository};
use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::EventBroadcaster;

/// Konfiguration fuer den Relay-Service
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximale gleichzeitige Verbindungen
    pub max_verbindungen: u32,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_groesse: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_verbindungen: 512,
            max_frame_groesse: funkraum_protocol::wire::DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct RelayState<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    /// Relay-Konfiguration
    pub config: Arc<RelayConfig>,
    /// Raumverzeichnis und Mitgliedschaften
    pub raum_dienst: Arc<RaumDienst<R>>,
    /// Anruf-Lebenszyklus und Audio-Akkumulator
    pub anruf_dienst: Arc<AnrufDienst<R>>,
    /// Event-Broadcaster (Ereignisse an Verbindungen senden)
    pub broadcaster: EventBroadcaster,
    /// Startzeitpunkt des Servers (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl<R> RelayState<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    /// Erstellt einen neuen RelayState
    pub fn neu(
        config: RelayConfig,
        raum_dienst: Arc<RaumDienst<R>>,
        anruf_dienst: Arc<AnrufDienst<R>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            raum_dienst,
            anruf_dienst,
            broadcaster: EventBroadcaster::neu(),
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
