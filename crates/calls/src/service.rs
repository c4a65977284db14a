//! AnrufDienst – Anruf-Lebenszyklus und Audio-Akkumulator
//!
//! Der Start-Pfad reserviert zuerst das Sitzungs-Register (der einzige
//! Serialisierungspunkt pro Raum) und persistiert dann die Anruf-Zeile;
//! schlaegt die Persistierung fehl, wird die Reservierung zurueckgerollt.
//! Clients sehen die Anruf-ID erst nach erfolgreichem Insert, daher kann
//! kein Append oder Ende auf eine noch fehlende Zeile verweisen.
//!
//! Audio-Appends desselben Anrufs werden ueber ein pro-Anruf-Mutex
//! serialisiert; Appends verschiedener Anrufe laufen frei nebeneinander.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use funkraum_core::types::AnrufId;
use funkraum_db::{
    models::{AnrufRecord, NeuerAnruf, RaumRecord},
    AnrufRepository, RaumRepository,
};

use crate::error::{CallError, CallResult};
use crate::registry::SitzungsRegister;

/// AnrufDienst verwaltet Anrufe und deren Audio-Aufnahmen
pub struct AnrufDienst<R: AnrufRepository + RaumRepository> {
    repo: Arc<R>,
    register: SitzungsRegister,
    /// Pro-Anruf-Schloesser fuer die serielle Append-Reihenfolge.
    /// Eintraege werden nie entfernt, damit zwei gleichzeitige Appends
    /// nie verschiedene Schloesser sehen koennen.
    audio_schloesser: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl<R: AnrufRepository + RaumRepository> AnrufDienst<R> {
    /// Erstellt einen neuen AnrufDienst
    pub fn neu(repo: Arc<R>, register: SitzungsRegister) -> Arc<Self> {
        Arc::new(Self {
            repo,
            register,
            audio_schloesser: DashMap::new(),
        })
    }

    /// Gibt das Sitzungs-Register zurueck
    pub fn register(&self) -> &SitzungsRegister {
        &self.register
    }

    /// Startet einen Anruf zwischen zwei Verbindungen im Raum.
    ///
    /// Fehler: `SitzungBereitsAktiv` wenn im Raum schon ein Anruf laeuft
    /// (bestehender Anruf und Register bleiben unveraendert),
    /// `UngueltigeEingabe` bei leerem Empfaenger.
    pub async fn anruf_starten(
        &self,
        raum: &RaumRecord,
        anrufer_id: &str,
        empfaenger_id: &str,
    ) -> CallResult<AnrufRecord> {
        if empfaenger_id.trim().is_empty() {
            return Err(CallError::UngueltigeEingabe(
                "Empfaenger-Verbindungs-ID ist erforderlich".into(),
            ));
        }

        let anruf_id = AnrufId::new();
        if !self.register.sitzung_beginnen(&raum.name, anruf_id) {
            return Err(CallError::SitzungBereitsAktiv(raum.name.clone()));
        }

        match self
            .repo
            .create(NeuerAnruf {
                id: anruf_id.inner(),
                room_id: raum.id,
                caller_id: anrufer_id,
                receiver_id: empfaenger_id,
            })
            .await
        {
            Ok(anruf) => {
                tracing::info!(
                    anruf_id = %anruf.id,
                    raum = %raum.name,
                    anrufer = anrufer_id,
                    empfaenger = empfaenger_id,
                    "Anruf gestartet"
                );
                Ok(anruf)
            }
            Err(e) => {
                // Reservierung zurueckrollen, der Raum bleibt anrufbar
                self.register.sitzung_freigeben(&raum.name, anruf_id);
                tracing::warn!(raum = %raum.name, fehler = %e, "Anruf-Persistierung fehlgeschlagen");
                Err(e.into())
            }
        }
    }

    /// Beendet einen Anruf: setzt Ende-Datum und Dauer, gibt die Sitzung
    /// des Raums frei.
    ///
    /// Ein bereits beendeter Anruf wird mit `AnrufBereitsBeendet`
    /// abgelehnt (keine Neuberechnung, keine Mutation).
    pub async fn anruf_beenden(&self, anruf_id: Uuid) -> CallResult<AnrufRecord> {
        let anruf = AnrufRepository::get_by_id(self.repo.as_ref(), anruf_id)
            .await?
            .ok_or_else(|| CallError::AnrufNichtGefunden(anruf_id.to_string()))?;

        if anruf.ended_at.is_some() {
            return Err(CallError::AnrufBereitsBeendet(anruf_id.to_string()));
        }

        let ende = Utc::now();
        // Clock-Skew darf keine negative Dauer erzeugen
        let dauer_sekunden = ((ende - anruf.started_at).num_milliseconds() as f64 / 1000.0).max(0.0);

        // mark_ended trifft nur eine noch offene Zeile; bei zwei
        // gleichzeitigen Beendern verliert genau einer hier
        if !self.repo.mark_ended(anruf_id, ende, dauer_sekunden).await? {
            return Err(CallError::AnrufBereitsBeendet(anruf_id.to_string()));
        }

        // Register erst nach erfolgreicher Persistierung freigeben
        if let Some(raum) = RaumRepository::get_by_id(self.repo.as_ref(), anruf.room_id).await? {
            self.register.sitzung_beenden(&raum.name);
        }

        tracing::info!(anruf_id = %anruf_id, dauer_sekunden, "Anruf beendet");

        Ok(AnrufRecord {
            ended_at: Some(ende),
            duration_secs: dauer_sekunden,
            ..anruf
        })
    }

    /// Haengt einen Audio-Chunk an die Aufnahme des Anrufs an.
    ///
    /// Gleichzeitige Chunks desselben Anrufs werden in Ankunftsreihenfolge
    /// serialisiert; verschiedene Anrufe blockieren einander nicht.
    pub async fn audio_anhaengen(&self, anruf_id: Uuid, chunk: &[u8]) -> CallResult<()> {
        if AnrufRepository::get_by_id(self.repo.as_ref(), anruf_id)
            .await?
            .is_none()
        {
            return Err(CallError::AnrufNichtGefunden(anruf_id.to_string()));
        }

        let schloss = self
            .audio_schloesser
            .entry(anruf_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = schloss.lock().await;

        self.repo.append_audio_chunk(anruf_id, chunk).await?;
        tracing::debug!(anruf_id = %anruf_id, bytes = chunk.len(), "Audio-Chunk angehaengt");
        Ok(())
    }

    /// Laedt einen Anruf anhand seiner ID
    pub async fn anruf_laden(&self, anruf_id: Uuid) -> CallResult<AnrufRecord> {
        AnrufRepository::get_by_id(self.repo.as_ref(), anruf_id)
            .await?
            .ok_or_else(|| CallError::AnrufNichtGefunden(anruf_id.to_string()))
    }

    /// Setzt die Gesamtaufnahme eines Anrufs zusammen (Materialisierung
    /// erst beim Lesen)
    pub async fn audio_laden(&self, anruf_id: Uuid) -> CallResult<Vec<u8>> {
        if AnrufRepository::get_by_id(self.repo.as_ref(), anruf_id)
            .await?
            .is_none()
        {
            return Err(CallError::AnrufNichtGefunden(anruf_id.to_string()));
        }

        self.repo
            .load_audio(anruf_id)
            .await?
            .ok_or_else(|| CallError::AudioNichtGefunden(anruf_id.to_string()))
    }
}
