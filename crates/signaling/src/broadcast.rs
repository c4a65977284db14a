//! Event-Broadcaster – Sendet Relay-Ereignisse an die richtigen Verbindungen
//!
//! Der EventBroadcaster verwaltet die Send-Queues aller verbundenen Clients
//! und die fluechtige Raum-Zugehoerigkeit fuer selektives Broadcasting.
//!
//! ## Selektives Broadcasting
//! - An eine Verbindung: `an_verbindung_senden` (Unicast-Relay)
//! - An einen Raum: `an_raum_senden`
//! - An einen Raum ausser eine Verbindung: `an_raum_ausser_senden`
//!
//! Ein Unicast an eine unbekannte VerbindungsId ist ein bewusstes No-op:
//! der Zielclient kann sich zwischen Lookup und Senden jederzeit trennen.

use dashmap::DashMap;
use funkraum_core::types::VerbindungsId;
use funkraum_protocol::ServerEreignis;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer verbundenen Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub verbindungs_id: VerbindungsId,
    pub tx: mpsc::Sender<ServerEreignis>,
}

impl ClientSender {
    /// Reiht ein Ereignis nicht-blockierend in die Queue ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, ereignis: ServerEreignis) -> bool {
        match self.tx.try_send(ereignis) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    verbindung = %self.verbindungs_id,
                    "Send-Queue voll – Ereignis verworfen"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    verbindung = %self.verbindungs_id,
                    "Send-Queue geschlossen (Client getrennt)"
                );
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Event-Broadcaster fuer alle verbundenen Clients
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    /// Client-Sender, indiziert nach VerbindungsId
    clients: DashMap<VerbindungsId, ClientSender>,
    /// Raum-Zugehoerigkeit: Raumname -> Verbindungen
    raum_mitglieder: DashMap<String, Vec<VerbindungsId>>,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                clients: DashMap::new(),
                raum_mitglieder: DashMap::new(),
            }),
        }
    }

    /// Registriert eine neue Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `ClientConnection` liest aus dieser Queue und sendet via TCP.
    pub fn client_registrieren(
        &self,
        verbindungs_id: VerbindungsId,
    ) -> mpsc::Receiver<ServerEreignis> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let sender = ClientSender { verbindungs_id, tx };
        self.inner.clients.insert(verbindungs_id, sender);
        tracing::debug!(verbindung = %verbindungs_id, "Verbindung im Broadcaster registriert");
        rx
    }

    /// Entfernt eine Verbindung aus dem Broadcaster und allen Raeumen
    pub fn client_entfernen(&self, verbindungs_id: &VerbindungsId) {
        self.inner.clients.remove(verbindungs_id);
        self.raum_verlassen(verbindungs_id);
        tracing::debug!(verbindung = %verbindungs_id, "Verbindung aus Broadcaster entfernt");
    }

    /// Fuegt eine Verbindung einem Raum hinzu (fuer selektives Broadcasting)
    ///
    /// Eine Verbindung ist in hoechstens einem Raum; eine bestehende
    /// Zugehoerigkeit wird vorher entfernt.
    pub fn raum_beitreten(&self, verbindungs_id: VerbindungsId, raum_name: &str) {
        self.raum_verlassen(&verbindungs_id);

        let mut mitglieder = self
            .inner
            .raum_mitglieder
            .entry(raum_name.to_string())
            .or_default();
        if !mitglieder.contains(&verbindungs_id) {
            mitglieder.push(verbindungs_id);
        }
    }

    /// Entfernt eine Verbindung aus ihrem Raum
    pub fn raum_verlassen(&self, verbindungs_id: &VerbindungsId) {
        self.inner.raum_mitglieder.iter_mut().for_each(|mut entry| {
            entry.value_mut().retain(|vid| vid != verbindungs_id);
        });
        // Leere Raum-Eintraege aufraeumen
        self.inner
            .raum_mitglieder
            .retain(|_, mitglieder| !mitglieder.is_empty());
    }

    /// Sendet ein Ereignis an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und das Ereignis
    /// eingereiht wurde. Unbekanntes Ziel ist ein No-op.
    pub fn an_verbindung_senden(
        &self,
        verbindungs_id: &VerbindungsId,
        ereignis: ServerEreignis,
    ) -> bool {
        match self.inner.clients.get(verbindungs_id) {
            Some(sender) => sender.senden(ereignis),
            None => {
                tracing::debug!(verbindung = %verbindungs_id, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Sendet ein Ereignis an alle Verbindungen in einem Raum
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_raum_senden(&self, raum_name: &str, ereignis: ServerEreignis) -> usize {
        let ids = match self.inner.raum_mitglieder.get(raum_name) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let mut gesendet = 0;
        for vid in &ids {
            if let Some(sender) = self.inner.clients.get(vid) {
                if sender.senden(ereignis.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    /// Sendet ein Ereignis an alle Verbindungen in einem Raum ausser einer
    ///
    /// Nuetzlich um Join/Leave-Ereignisse zu verteilen ohne den Ausloeser
    /// zu informieren.
    pub fn an_raum_ausser_senden(
        &self,
        raum_name: &str,
        ausgeschlossen: &VerbindungsId,
        ereignis: ServerEreignis,
    ) -> usize {
        let ids = match self.inner.raum_mitglieder.get(raum_name) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let mut gesendet = 0;
        for vid in &ids {
            if vid == ausgeschlossen {
                continue;
            }
            if let Some(sender) = self.inner.clients.get(vid) {
                if sender.senden(ereignis.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn client_anzahl(&self) -> usize {
        self.inner.clients.len()
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, verbindungs_id: &VerbindungsId) -> bool {
        self.inner.clients.contains_key(verbindungs_id)
    }

    /// Gibt alle VerbindungsIds in einem Raum zurueck
    pub fn verbindungen_im_raum(&self, raum_name: &str) -> Vec<VerbindungsId> {
        self.inner
            .raum_mitglieder
            .get(raum_name)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ereignis(nachricht: &str) -> ServerEreignis {
        ServerEreignis::fehler(nachricht)
    }

    #[tokio::test]
    async fn client_registrieren_und_senden() {
        let broadcaster = EventBroadcaster::neu();
        let vid = VerbindungsId::new();

        let mut rx = broadcaster.client_registrieren(vid);
        assert!(broadcaster.ist_registriert(&vid));

        let gesendet = broadcaster.an_verbindung_senden(&vid, test_ereignis("hallo"));
        assert!(gesendet);

        let empfangen = rx.try_recv().expect("Ereignis muss vorhanden sein");
        assert_eq!(empfangen, test_ereignis("hallo"));
    }

    #[tokio::test]
    async fn unicast_an_unbekannte_verbindung_ist_no_op() {
        let broadcaster = EventBroadcaster::neu();
        let gesendet = broadcaster.an_verbindung_senden(&VerbindungsId::new(), test_ereignis("x"));
        assert!(!gesendet);
    }

    #[tokio::test]
    async fn an_raum_senden() {
        let broadcaster = EventBroadcaster::neu();

        let vid1 = VerbindungsId::new();
        let vid2 = VerbindungsId::new();
        let vid3 = VerbindungsId::new(); // kein Raum

        let mut rx1 = broadcaster.client_registrieren(vid1);
        let mut rx2 = broadcaster.client_registrieren(vid2);
        let mut rx3 = broadcaster.client_registrieren(vid3);

        broadcaster.raum_beitreten(vid1, "lobby");
        broadcaster.raum_beitreten(vid2, "lobby");

        let gesendet = broadcaster.an_raum_senden("lobby", test_ereignis("an-alle"));
        assert_eq!(gesendet, 2);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_err(), "vid3 darf nichts empfangen");
    }

    #[tokio::test]
    async fn an_raum_ausser_senden() {
        let broadcaster = EventBroadcaster::neu();

        let vid1 = VerbindungsId::new();
        let vid2 = VerbindungsId::new();

        let mut rx1 = broadcaster.client_registrieren(vid1);
        let mut rx2 = broadcaster.client_registrieren(vid2);

        broadcaster.raum_beitreten(vid1, "lobby");
        broadcaster.raum_beitreten(vid2, "lobby");

        // vid1 ist der Ausloeser und bekommt kein Ereignis
        broadcaster.an_raum_ausser_senden("lobby", &vid1, test_ereignis("nur-andere"));

        assert!(rx1.try_recv().is_err(), "Ausloeser darf nichts empfangen");
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn raum_wechsel_entfernt_alte_zugehoerigkeit() {
        let broadcaster = EventBroadcaster::neu();
        let vid = VerbindungsId::new();

        let _rx = broadcaster.client_registrieren(vid);
        broadcaster.raum_beitreten(vid, "alt");
        broadcaster.raum_beitreten(vid, "neu");

        assert!(broadcaster.verbindungen_im_raum("alt").is_empty());
        assert_eq!(broadcaster.verbindungen_im_raum("neu"), vec![vid]);
    }

    #[test]
    fn client_entfernen_bereinigt_raum_zugehoerigkeit() {
        let broadcaster = EventBroadcaster::neu();
        let vid = VerbindungsId::new();

        let _rx = broadcaster.client_registrieren(vid);
        broadcaster.raum_beitreten(vid, "lobby");
        assert_eq!(broadcaster.verbindungen_im_raum("lobby").len(), 1);

        broadcaster.client_entfernen(&vid);
        assert!(!broadcaster.ist_registriert(&vid));
        assert!(broadcaster.verbindungen_im_raum("lobby").is_empty());
    }
}
