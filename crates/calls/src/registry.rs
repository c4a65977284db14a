//! Sitzungs-Register – Raumname -> aktiver Anruf
//!
//! Haelt den fluechtigen Index der laufenden Anrufe und ist der einzige
//! Serialisierungspunkt fuer den Anruf-Start: `sitzung_beginnen` ist ein
//! atomares Check-and-Insert pro Raum, sodass von zwei gleichzeitigen
//! Start-Versuchen im selben Raum genau einer gewinnt.
//!
//! Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use funkraum_core::types::AnrufId;
use std::sync::Arc;

/// In-memory Register der aktiven Anrufe, indiziert nach Raumname
#[derive(Clone)]
pub struct SitzungsRegister {
    inner: Arc<SitzungsRegisterInner>,
}

struct SitzungsRegisterInner {
    aktive: DashMap<String, AnrufId>,
}

impl SitzungsRegister {
    /// Erstellt ein neues, leeres Register
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(SitzungsRegisterInner {
                aktive: DashMap::new(),
            }),
        }
    }

    /// Atomares Check-and-Insert: reserviert den Raum fuer den Anruf.
    ///
    /// Gibt `false` zurueck wenn der Raum bereits eine aktive Sitzung hat;
    /// der Verlierer darf danach nichts weiter mutieren.
    pub fn sitzung_beginnen(&self, raum_name: &str, anruf_id: AnrufId) -> bool {
        match self.inner.aktive.entry(raum_name.to_string()) {
            Entry::Occupied(_) => {
                tracing::debug!(raum = raum_name, "Sitzung bereits aktiv");
                false
            }
            Entry::Vacant(eintrag) => {
                eintrag.insert(anruf_id);
                tracing::debug!(raum = raum_name, anruf_id = %anruf_id, "Sitzung begonnen");
                true
            }
        }
    }

    /// Entfernt die Sitzung eines Raums. Idempotent: ein Raum ohne aktive
    /// Sitzung ist ein No-op, kein Fehler.
    pub fn sitzung_beenden(&self, raum_name: &str) {
        if self.inner.aktive.remove(raum_name).is_some() {
            tracing::debug!(raum = raum_name, "Sitzung beendet");
        }
    }

    /// Gibt die Reservierung frei, aber nur wenn sie noch zu diesem Anruf
    /// gehoert (Rollback nach fehlgeschlagener Persistierung).
    pub fn sitzung_freigeben(&self, raum_name: &str, anruf_id: AnrufId) {
        self.inner
            .aktive
            .remove_if(raum_name, |_, eingetragen| *eingetragen == anruf_id);
    }

    /// Prueft ob der Raum eine aktive Sitzung hat
    pub fn ist_aktiv(&self, raum_name: &str) -> bool {
        self.inner.aktive.contains_key(raum_name)
    }

    /// Gibt die Anruf-ID der aktiven Sitzung zurueck
    pub fn aktive_sitzung(&self, raum_name: &str) -> Option<AnrufId> {
        self.inner.aktive.get(raum_name).map(|e| *e.value())
    }

    /// Gibt die Anzahl aktiver Sitzungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.aktive.len()
    }
}

impl Default for SitzungsRegister {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
