//! Ereignis-Dispatcher – Routet Client-Ereignisse an die Dienste
//!
//! Der Dispatcher empfaengt `ClientEreignis`-Frames von einer
//! `ClientConnection`, fuehrt die passende Dienst-Operation aus und
//! verteilt die resultierenden Ereignisse ueber den Broadcaster.
//!
//! ## Fehlerpolitik
//! Handler-Fehler beenden nie die Verbindung und nie den Prozess: jeder
//! Fehler wird in ein `error {message}`-Ereignis an die ausloesende
//! Verbindung umgesetzt. Persistenz-Fehler werden generisch gemeldet,
//! Details bleiben im Log.
//!
//! ## Raum-Politik
//! Eine Verbindung ist in hoechstens einem Raum. Ein Join in einen
//! zweiten Raum ohne vorheriges Verlassen wird abgelehnt; ein erneuter
//! Join in den aktuellen Raum ist ein idempotentes No-op. Verlassen
//! werden kann nur der eigene Raum.

use funkraum_core::types::{AnrufId, VerbindungsId};
use funkraum_db::{AnrufRepository, RaumRepository, TeilnehmerRepository};
use funkraum_protocol::{ClientEreignis, ServerEreignis};
use std::sync::Arc;

use funkraum_calls::CallError;

use crate::server_state::RelayState;

/// Dispatcher-Kontext – Zustand der aktuellen Verbindung
pub struct DispatcherContext {
    /// Vom Transport vergebene VerbindungsId
    pub verbindungs_id: VerbindungsId,
    /// Raum in dem die Verbindung gerade ist (hoechstens einer)
    pub aktueller_raum: Option<String>,
}

impl DispatcherContext {
    /// Erstellt einen neuen Kontext fuer eine frische Verbindung
    pub fn neu(verbindungs_id: VerbindungsId) -> Self {
        Self {
            verbindungs_id,
            aktueller_raum: None,
        }
    }
}

/// Zentraler Ereignis-Dispatcher
///
/// Routet eingehende Client-Ereignisse an die Dienste und gibt das
/// Antwort-Ereignis fuer die ausloesende Verbindung zurueck.
pub struct EreignisDispatcher<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    state: Arc<RelayState<R>>,
}

impl<R> EreignisDispatcher<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<RelayState<R>>) -> Self {
        Self { state }
    }

    /// Verarbeitet ein eingehendes Client-Ereignis
    ///
    /// Gibt `None` zurueck wenn an die ausloesende Verbindung nichts
    /// gesendet werden soll (Broadcasts laufen intern ueber den
    /// Broadcaster).
    pub async fn dispatch(
        &self,
        ereignis: ClientEreignis,
        ctx: &mut DispatcherContext,
    ) -> Option<ServerEreignis> {
        match ereignis {
            ClientEreignis::JoinRoom { room } => self.raum_beitreten(room, ctx).await,
            ClientEreignis::LeaveRoom { room } => self.raum_verlassen(room, ctx).await,
            ClientEreignis::Signal { to, signal } => self.signal_weiterleiten(to, signal, ctx),
            ClientEreignis::StartCall {
                room,
                receiver_socket_id,
            } => self.anruf_starten(room, receiver_socket_id, ctx).await,
            ClientEreignis::EndCall { call_id, room } => {
                self.anruf_beenden(call_id, room, ctx).await
            }
            ClientEreignis::StartSpeaking { room } => self.sprech_status(room, true, ctx),
            ClientEreignis::StopSpeaking { room } => self.sprech_status(room, false, ctx),
        }
    }

    // -----------------------------------------------------------------------
    // Raum-Ereignisse
    // -----------------------------------------------------------------------

    async fn raum_beitreten(
        &self,
        room: String,
        ctx: &mut DispatcherContext,
    ) -> Option<ServerEreignis> {
        if let Some(aktuell) = &ctx.aktueller_raum {
            if aktuell == &room {
                // Erneuter Join in denselben Raum ist idempotent
                return None;
            }
            return Some(ServerEreignis::fehler(format!(
                "Bereits in Raum '{aktuell}' – zuerst verlassen"
            )));
        }

        let raum = match self.state.raum_dienst.sicherstellen(&room).await {
            Ok(r) => r,
            Err(e) => return Some(self.fehler_ereignis(e)),
        };

        let verbindung = ctx.verbindungs_id.to_string();
        if let Err(e) = self.state.raum_dienst.beitreten(&verbindung, &raum).await {
            return Some(self.fehler_ereignis(e));
        }

        self.state
            .broadcaster
            .raum_beitreten(ctx.verbindungs_id, &room);
        ctx.aktueller_raum = Some(room.clone());

        // Die anderen Mitglieder informieren, nicht den Ausloeser
        self.state.broadcaster.an_raum_ausser_senden(
            &room,
            &ctx.verbindungs_id,
            ServerEreignis::UserJoined {
                connection_id: ctx.verbindungs_id,
            },
        );

        tracing::info!(verbindung = %ctx.verbindungs_id, raum = %room, "Raum betreten");
        None
    }

    async fn raum_verlassen(
        &self,
        room: String,
        ctx: &mut DispatcherContext,
    ) -> Option<ServerEreignis> {
        // Nur der eigene Raum kann verlassen werden; sonst wuerde die
        // Verbindung aus ihrer tatsaechlichen Broadcast-Gruppe fallen
        if ctx.aktueller_raum.as_deref() != Some(room.as_str()) {
            return Some(ServerEreignis::fehler(format!("Nicht in Raum '{room}'")));
        }

        let verbindung = ctx.verbindungs_id.to_string();
        if let Err(e) = self.state.raum_dienst.verlassen(&verbindung, &room).await {
            return Some(self.fehler_ereignis(e));
        }

        ctx.aktueller_raum = None;
        self.state.broadcaster.raum_verlassen(&ctx.verbindungs_id);

        // Nach dem Austritt erreicht der Broadcast nur die Verbliebenen
        self.state.broadcaster.an_raum_senden(
            &room,
            ServerEreignis::UserLeft {
                connection_id: ctx.verbindungs_id,
            },
        );

        tracing::info!(verbindung = %ctx.verbindungs_id, raum = %room, "Raum verlassen");
        None
    }

    // -----------------------------------------------------------------------
    // Signal-Relay
    // -----------------------------------------------------------------------

    fn signal_weiterleiten(
        &self,
        to: String,
        signal: serde_json::Value,
        ctx: &DispatcherContext,
    ) -> Option<ServerEreignis> {
        // Unbekanntes oder ungueltiges Ziel ist ein bewusstes No-op
        let ziel = match VerbindungsId::parse(&to) {
            Some(z) => z,
            None => {
                tracing::debug!(ziel = %to, "Signal an ungueltige VerbindungsId verworfen");
                return None;
            }
        };

        let zugestellt = self.state.broadcaster.an_verbindung_senden(
            &ziel,
            ServerEreignis::Signal {
                from: ctx.verbindungs_id,
                signal,
            },
        );
        if !zugestellt {
            tracing::debug!(ziel = %ziel, "Signal an unbekannte Verbindung verworfen");
        }
        None
    }

    // -----------------------------------------------------------------------
    // Anruf-Ereignisse
    // -----------------------------------------------------------------------

    async fn anruf_starten(
        &self,
        room: String,
        receiver_socket_id: String,
        ctx: &DispatcherContext,
    ) -> Option<ServerEreignis> {
        let gefunden = match self.state.raum_dienst.finde_nach_name(&room).await {
            Ok(Some(g)) => g,
            Ok(None) => {
                return Some(ServerEreignis::fehler(format!("Raum nicht gefunden: {room}")));
            }
            Err(e) => return Some(self.fehler_ereignis(e)),
        };

        let anrufer = ctx.verbindungs_id.to_string();
        let anruf = match self
            .state
            .anruf_dienst
            .anruf_starten(&gefunden.raum, &anrufer, &receiver_socket_id)
            .await
        {
            Ok(a) => a,
            Err(e) => return Some(self.fehler_ereignis(e)),
        };

        let call_id = AnrufId(anruf.id);

        // Den Empfaenger benachrichtigen; eine unbekannte Zieladresse
        // ist wie beim Signal-Relay ein No-op
        match VerbindungsId::parse(&receiver_socket_id) {
            Some(empfaenger) => {
                self.state.broadcaster.an_verbindung_senden(
                    &empfaenger,
                    ServerEreignis::IncomingCall {
                        call_id,
                        from: ctx.verbindungs_id,
                    },
                );
            }
            None => {
                tracing::debug!(
                    ziel = %receiver_socket_id,
                    "Anruf-Empfaenger ist keine gueltige VerbindungsId"
                );
            }
        }

        Some(ServerEreignis::CallStarted { call_id })
    }

    async fn anruf_beenden(
        &self,
        call_id: String,
        room: String,
        ctx: &DispatcherContext,
    ) -> Option<ServerEreignis> {
        let anruf_id = match AnrufId::parse(&call_id) {
            Some(id) => id,
            None => {
                return Some(ServerEreignis::fehler(format!(
                    "Ungueltige Anruf-ID: {call_id}"
                )));
            }
        };

        let anruf = match self.state.anruf_dienst.anruf_beenden(anruf_id.inner()).await {
            Ok(a) => a,
            Err(e) => return Some(self.fehler_ereignis(e)),
        };

        // Der Raum hoert auf zu sprechen
        self.state.broadcaster.an_raum_senden(
            &room,
            ServerEreignis::SpeakingStatus {
                connection_id: ctx.verbindungs_id,
                is_speaking: false,
            },
        );

        // Beide Anruf-Teilnehmer informieren
        for teilnehmer in [&anruf.caller_id, &anruf.receiver_id] {
            if let Some(vid) = VerbindungsId::parse(teilnehmer) {
                self.state
                    .broadcaster
                    .an_verbindung_senden(&vid, ServerEreignis::CallEnded { call_id: anruf_id });
            }
        }

        None
    }

    // -----------------------------------------------------------------------
    // Sprech-Status
    // -----------------------------------------------------------------------

    fn sprech_status(
        &self,
        room: String,
        is_speaking: bool,
        ctx: &DispatcherContext,
    ) -> Option<ServerEreignis> {
        self.state.broadcaster.an_raum_senden(
            &room,
            ServerEreignis::SpeakingStatus {
                connection_id: ctx.verbindungs_id,
                is_speaking,
            },
        );
        None
    }

    // -----------------------------------------------------------------------
    // Disconnect
    // -----------------------------------------------------------------------

    /// Bereinigt alle Ressourcen einer Verbindung beim Trennen
    ///
    /// Entfernt die Teilnehmer-Zeilen, verlaesst die Broadcast-Gruppe und
    /// informiert die verbliebenen Raummitglieder mit `user-left`.
    pub async fn verbindung_trennen(&self, ctx: &mut DispatcherContext) {
        let verbindung = ctx.verbindungs_id.to_string();

        if let Err(e) = self
            .state
            .raum_dienst
            .verbindung_entfernen(&verbindung)
            .await
        {
            tracing::warn!(
                verbindung = %ctx.verbindungs_id,
                fehler = %e,
                "Disconnect-Aufraeumen fehlgeschlagen"
            );
        }

        self.state.broadcaster.client_entfernen(&ctx.verbindungs_id);

        if let Some(raum) = ctx.aktueller_raum.take() {
            self.state.broadcaster.an_raum_senden(
                &raum,
                ServerEreignis::UserLeft {
                    connection_id: ctx.verbindungs_id,
                },
            );
        }

        tracing::debug!(verbindung = %ctx.verbindungs_id, "Verbindungs-Ressourcen bereinigt");
    }

    /// Setzt einen Dienst-Fehler in ein Fehler-Ereignis um
    ///
    /// Persistenz-Fehler werden generisch gemeldet; der Rest traegt die
    /// Fehlermeldung des Dienstes.
    fn fehler_ereignis(&self, fehler: CallError) -> ServerEreignis {
        match fehler {
            CallError::Datenbank(e) => {
                tracing::error!(fehler = %e, "Persistenz-Fehler im Dispatcher");
                ServerEreignis::fehler("Interner Fehler")
            }
            andere => ServerEreignis::fehler(andere.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_state::RelayConfig;
    use funkraum_calls::{AnrufDienst, RaumDienst, SitzungsRegister};
    use funkraum_db::SqliteDb;
    use serde_json::json;
    use tokio::sync::mpsc;

    async fn test_state() -> Arc<RelayState<SqliteDb>> {
        let db = Arc::new(
            SqliteDb::in_memory()
                .await
                .expect("In-Memory-DB konnte nicht geoeffnet werden"),
        );
        RelayState::neu(
            RelayConfig::default(),
            RaumDienst::neu(db.clone()),
            AnrufDienst::neu(db, SitzungsRegister::neu()),
        )
    }

    /// Registriert eine Verbindung und gibt Kontext + Empfangs-Queue zurueck
    fn verbinden(
        state: &Arc<RelayState<SqliteDb>>,
    ) -> (DispatcherContext, mpsc::Receiver<ServerEreignis>) {
        let vid = VerbindungsId::new();
        let rx = state.broadcaster.client_registrieren(vid);
        (DispatcherContext::neu(vid), rx)
    }

    async fn beitreten(
        dispatcher: &EreignisDispatcher<SqliteDb>,
        ctx: &mut DispatcherContext,
        raum: &str,
    ) {
        let antwort = dispatcher
            .dispatch(ClientEreignis::JoinRoom { room: raum.into() }, ctx)
            .await;
        assert!(antwort.is_none(), "Join darf keinen Fehler liefern");
    }

    #[tokio::test]
    async fn join_informiert_bestehende_mitglieder() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, mut rx_a) = verbinden(&state);
        let (mut ctx_b, _rx_b) = verbinden(&state);

        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "lobby").await;

        let ereignis = rx_a.try_recv().expect("A muss user-joined empfangen");
        assert_eq!(
            ereignis,
            ServerEreignis::UserJoined {
                connection_id: ctx_b.verbindungs_id
            }
        );
    }

    #[tokio::test]
    async fn join_in_zweiten_raum_wird_abgelehnt() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx, _rx) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx, "lobby").await;

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::JoinRoom {
                    room: "werkstatt".into(),
                },
                &mut ctx,
            )
            .await;
        assert!(matches!(antwort, Some(ServerEreignis::Error { .. })));
        assert_eq!(ctx.aktueller_raum.as_deref(), Some("lobby"));
    }

    #[tokio::test]
    async fn erneuter_join_in_denselben_raum_ist_idempotent() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx, _rx) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx, "lobby").await;
        beitreten(&dispatcher, &mut ctx, "lobby").await;

        assert_eq!(ctx.aktueller_raum.as_deref(), Some("lobby"));
    }

    #[tokio::test]
    async fn leave_informiert_verbliebene() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, mut rx_a) = verbinden(&state);
        let (mut ctx_b, _rx_b) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "lobby").await;
        let _ = rx_a.try_recv(); // user-joined von B abraeumen

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::LeaveRoom {
                    room: "lobby".into(),
                },
                &mut ctx_b,
            )
            .await;
        assert!(antwort.is_none());

        let ereignis = rx_a.try_recv().expect("A muss user-left empfangen");
        assert_eq!(
            ereignis,
            ServerEreignis::UserLeft {
                connection_id: ctx_b.verbindungs_id
            }
        );
        assert!(ctx_b.aktueller_raum.is_none());
    }

    #[tokio::test]
    async fn leave_eines_fremden_raums_wird_abgelehnt() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, _rx_a) = verbinden(&state);
        let (mut ctx_b, mut rx_b) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "werkstatt").await;

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::LeaveRoom {
                    room: "werkstatt".into(),
                },
                &mut ctx_a,
            )
            .await;
        assert!(
            matches!(antwort, Some(ServerEreignis::Error { .. })),
            "Leave eines fremden Raums muss abgelehnt werden"
        );

        // A bleibt Mitglied des eigenen Raums, inklusive Broadcast-Gruppe
        assert_eq!(ctx_a.aktueller_raum.as_deref(), Some("lobby"));
        assert!(state
            .broadcaster
            .verbindungen_im_raum("lobby")
            .contains(&ctx_a.verbindungs_id));

        // Der fremde Raum bekommt kein user-left
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn signal_erreicht_nur_das_ziel() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, _rx_a) = verbinden(&state);
        let (ctx_b, mut rx_b) = verbinden(&state);
        let (_ctx_c, mut rx_c) = verbinden(&state);

        let payload = json!({"type": "offer", "sdp": "v=0"});
        let antwort = dispatcher
            .dispatch(
                ClientEreignis::Signal {
                    to: ctx_b.verbindungs_id.to_string(),
                    signal: payload.clone(),
                },
                &mut ctx_a,
            )
            .await;
        assert!(antwort.is_none());

        let ereignis = rx_b.try_recv().expect("B muss das Signal empfangen");
        assert_eq!(
            ereignis,
            ServerEreignis::Signal {
                from: ctx_a.verbindungs_id,
                signal: payload,
            }
        );
        assert!(rx_c.try_recv().is_err(), "C darf nichts empfangen");
    }

    #[tokio::test]
    async fn signal_an_unbekanntes_ziel_ist_no_op() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());
        let (mut ctx, mut rx) = verbinden(&state);

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::Signal {
                    to: VerbindungsId::new().to_string(),
                    signal: json!({}),
                },
                &mut ctx,
            )
            .await;

        assert!(antwort.is_none(), "Kein Fehler an den Absender");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn start_call_benachrichtigt_anrufer_und_empfaenger() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, _rx_a) = verbinden(&state);
        let (mut ctx_b, mut rx_b) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "lobby").await;

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::StartCall {
                    room: "lobby".into(),
                    receiver_socket_id: ctx_b.verbindungs_id.to_string(),
                },
                &mut ctx_a,
            )
            .await;

        let call_id = match antwort {
            Some(ServerEreignis::CallStarted { call_id }) => call_id,
            andere => panic!("Erwartet call-started, war {andere:?}"),
        };

        // B trat zuletzt bei, in der Queue liegt nur der eingehende Anruf
        let ereignis = rx_b.try_recv().expect("B muss incoming-call empfangen");
        assert_eq!(
            ereignis,
            ServerEreignis::IncomingCall {
                call_id,
                from: ctx_a.verbindungs_id,
            }
        );
    }

    #[tokio::test]
    async fn start_call_in_unbekanntem_raum() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());
        let (mut ctx, _rx) = verbinden(&state);

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::StartCall {
                    room: "gibt-es-nicht".into(),
                    receiver_socket_id: VerbindungsId::new().to_string(),
                },
                &mut ctx,
            )
            .await;
        assert!(matches!(antwort, Some(ServerEreignis::Error { .. })));
    }

    #[tokio::test]
    async fn zweiter_start_call_liefert_fehler_an_verlierer() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, _rx_a) = verbinden(&state);
        let (mut ctx_b, _rx_b) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "lobby").await;

        let erster = dispatcher
            .dispatch(
                ClientEreignis::StartCall {
                    room: "lobby".into(),
                    receiver_socket_id: ctx_b.verbindungs_id.to_string(),
                },
                &mut ctx_a,
            )
            .await;
        assert!(matches!(erster, Some(ServerEreignis::CallStarted { .. })));

        let zweiter = dispatcher
            .dispatch(
                ClientEreignis::StartCall {
                    room: "lobby".into(),
                    receiver_socket_id: ctx_a.verbindungs_id.to_string(),
                },
                &mut ctx_b,
            )
            .await;
        assert!(
            matches!(zweiter, Some(ServerEreignis::Error { .. })),
            "Verlierer muss ein Fehler-Ereignis bekommen"
        );
    }

    #[tokio::test]
    async fn end_call_informiert_beide_teilnehmer() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, mut rx_a) = verbinden(&state);
        let (mut ctx_b, mut rx_b) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "lobby").await;

        let call_id = match dispatcher
            .dispatch(
                ClientEreignis::StartCall {
                    room: "lobby".into(),
                    receiver_socket_id: ctx_b.verbindungs_id.to_string(),
                },
                &mut ctx_a,
            )
            .await
        {
            Some(ServerEreignis::CallStarted { call_id }) => call_id,
            andere => panic!("Erwartet call-started, war {andere:?}"),
        };

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::EndCall {
                    call_id: call_id.to_string(),
                    room: "lobby".into(),
                },
                &mut ctx_a,
            )
            .await;
        assert!(antwort.is_none());

        let mut a_hat_ende = false;
        while let Ok(ereignis) = rx_a.try_recv() {
            if ereignis == (ServerEreignis::CallEnded { call_id }) {
                a_hat_ende = true;
            }
        }
        let mut b_hat_ende = false;
        while let Ok(ereignis) = rx_b.try_recv() {
            if ereignis == (ServerEreignis::CallEnded { call_id }) {
                b_hat_ende = true;
            }
        }
        assert!(a_hat_ende, "Anrufer muss call-ended empfangen");
        assert!(b_hat_ende, "Empfaenger muss call-ended empfangen");
    }

    #[tokio::test]
    async fn end_call_mit_ungueltiger_id() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());
        let (mut ctx, _rx) = verbinden(&state);

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::EndCall {
                    call_id: "keine-uuid".into(),
                    room: "lobby".into(),
                },
                &mut ctx,
            )
            .await;
        assert!(matches!(antwort, Some(ServerEreignis::Error { .. })));
    }

    #[tokio::test]
    async fn sprech_status_erreicht_den_raum() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, _rx_a) = verbinden(&state);
        let (mut ctx_b, mut rx_b) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "lobby").await;

        let antwort = dispatcher
            .dispatch(
                ClientEreignis::StartSpeaking {
                    room: "lobby".into(),
                },
                &mut ctx_a,
            )
            .await;
        assert!(antwort.is_none());

        let ereignis = rx_b.try_recv().expect("B muss speaking-status empfangen");
        assert_eq!(
            ereignis,
            ServerEreignis::SpeakingStatus {
                connection_id: ctx_a.verbindungs_id,
                is_speaking: true,
            }
        );
    }

    #[tokio::test]
    async fn disconnect_raeumt_auf_und_informiert() {
        let state = test_state().await;
        let dispatcher = EreignisDispatcher::neu(state.clone());

        let (mut ctx_a, mut rx_a) = verbinden(&state);
        let (mut ctx_b, _rx_b) = verbinden(&state);
        beitreten(&dispatcher, &mut ctx_a, "lobby").await;
        beitreten(&dispatcher, &mut ctx_b, "lobby").await;
        let _ = rx_a.try_recv(); // user-joined von B abraeumen

        dispatcher.verbindung_trennen(&mut ctx_b).await;

        assert!(!state.broadcaster.ist_registriert(&ctx_b.verbindungs_id));
        let ereignis = rx_a.try_recv().expect("A muss user-left empfangen");
        assert_eq!(
            ereignis,
            ServerEreignis::UserLeft {
                connection_id: ctx_b.verbindungs_id
            }
        );

        // Die Teilnehmer-Zeile ist weg
        let gefunden = state
            .raum_dienst
            .finde_nach_name("lobby")
            .await
            .expect("Lookup")
            .expect("Raum muss existieren");
        assert_eq!(gefunden.teilnehmer.len(), 1);
    }
}
