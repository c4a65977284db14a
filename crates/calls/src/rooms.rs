//! RaumDienst – Raumverzeichnis und Mitgliedschaften
//!
//! Raeume werden beim ersten Join lazy angelegt und nie geloescht
//! (ungenutzte Raeume sind harmloser Leerlauf-Zustand, dokumentierte
//! Einschraenkung). Mitgliedschaften leben nur solange die Verbindung
//! "im" Raum ist; Disconnect raeumt sie unbedingt ab.

use std::sync::Arc;

use funkraum_db::{
    models::{RaumRecord, TeilnehmerRecord},
    RaumRepository, TeilnehmerRepository,
};

use crate::error::{CallError, CallResult};

/// Raum samt aktueller Teilnehmerliste
#[derive(Debug, Clone)]
pub struct RaumMitTeilnehmern {
    pub raum: RaumRecord,
    pub teilnehmer: Vec<TeilnehmerRecord>,
}

/// RaumDienst verwaltet das Raumverzeichnis und die Mitgliedschaften
pub struct RaumDienst<R: RaumRepository + TeilnehmerRepository> {
    repo: Arc<R>,
}

impl<R: RaumRepository + TeilnehmerRepository> RaumDienst<R> {
    /// Erstellt einen neuen RaumDienst
    pub fn neu(repo: Arc<R>) -> Arc<Self> {
        Arc::new(Self { repo })
    }

    /// Exakte Namenssuche, inklusive aktueller Teilnehmerliste
    pub async fn finde_nach_name(&self, name: &str) -> CallResult<Option<RaumMitTeilnehmern>> {
        let raum = match self.repo.get_by_name(name).await? {
            Some(r) => r,
            None => return Ok(None),
        };

        let teilnehmer = self.repo.list_for_room(raum.id).await?;
        Ok(Some(RaumMitTeilnehmern { raum, teilnehmer }))
    }

    /// Idempotentes Get-or-Create
    pub async fn sicherstellen(&self, name: &str) -> CallResult<RaumRecord> {
        if name.is_empty() {
            return Err(CallError::UngueltigeEingabe(
                "Raumname darf nicht leer sein".into(),
            ));
        }

        let raum = self.repo.ensure(name).await?;
        Ok(raum)
    }

    /// Mitgliedschaft anlegen (idempotent bei doppeltem Join)
    pub async fn beitreten(&self, connection_id: &str, raum: &RaumRecord) -> CallResult<TeilnehmerRecord> {
        let teilnehmer = self.repo.add(connection_id, raum.id).await?;
        tracing::debug!(
            verbindung = connection_id,
            raum = %raum.name,
            "Teilnehmer beigetreten"
        );
        Ok(teilnehmer)
    }

    /// Mitgliedschaft in einem bestimmten Raum entfernen
    pub async fn verlassen(&self, connection_id: &str, raum_name: &str) -> CallResult<()> {
        let raum = self
            .repo
            .get_by_name(raum_name)
            .await?
            .ok_or_else(|| CallError::RaumNichtGefunden(raum_name.to_string()))?;

        let entfernt = self.repo.remove_from_room(connection_id, raum.id).await?;
        if !entfernt {
            tracing::debug!(
                verbindung = connection_id,
                raum = raum_name,
                "Verlassen ohne Mitgliedschaft (No-op)"
            );
        }
        Ok(())
    }

    /// Alle Mitgliedschaften einer Verbindung entfernen (Disconnect-Pfad,
    /// unbedingt aktiv)
    pub async fn verbindung_entfernen(&self, connection_id: &str) -> CallResult<u64> {
        let entfernt = self.repo.remove_by_connection(connection_id).await?;
        if entfernt > 0 {
            tracing::debug!(
                verbindung = connection_id,
                zeilen = entfernt,
                "Mitgliedschaften nach Disconnect entfernt"
            );
        }
        Ok(entfernt)
    }
}
