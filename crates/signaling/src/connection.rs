//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Der Transport vergibt beim Accept eine frische
//! `VerbindungsId` und teilt sie dem Client als erstes ausgehendes
//! Ereignis mit (`connected {connectionId}`) – Clients adressieren
//! einander nur ueber diese IDs.
//!
//! ## Zustand
//! ```text
//! Verbunden -> (ImRaum)* -> Getrennt
//! ```
//!
//! Frame-Fehler eines Clients trennen nur diese Verbindung, nie den
//! Prozess. Dispatch-Fehler werden als `error`-Ereignis beantwortet.

use futures_util::{SinkExt, StreamExt};
use funkraum_core::types::VerbindungsId;
use funkraum_db::{AnrufRepository, RaumRepository, TeilnehmerRepository};
use funkraum_protocol::{wire::ServerCodec, ServerEreignis};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::dispatcher::{DispatcherContext, EreignisDispatcher};
use crate::server_state::RelayState;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Frames via `FrameCodec`, dispatcht an `EreignisDispatcher` und
/// sendet Antworten sowie Broadcast-Ereignisse zurueck. Laeuft in einem
/// eigenen tokio-Task.
pub struct ClientConnection<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    state: Arc<RelayState<R>>,
    peer_addr: SocketAddr,
    verbindungs_id: VerbindungsId,
}

impl<R> ClientConnection<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    /// Erstellt eine neue ClientConnection mit frischer VerbindungsId
    pub fn neu(state: Arc<RelayState<R>>, peer_addr: SocketAddr) -> Self {
        Self {
            state,
            peer_addr,
            verbindungs_id: VerbindungsId::new(),
        }
    }

    /// Gibt die vergebene VerbindungsId zurueck
    pub fn verbindungs_id(&self) -> VerbindungsId {
        self.verbindungs_id
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht; raeumt danach alle Ressourcen der Verbindung ab.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;
        let verbindungs_id = self.verbindungs_id;

        tracing::info!(peer = %peer_addr, verbindung = %verbindungs_id, "Neue Verbindung");

        let codec = ServerCodec::with_max_size(self.state.config.max_frame_groesse);
        let mut framed = Framed::new(stream, codec);

        // Empfangs-Queue fuer Broadcast-Ereignisse (Broadcaster -> TCP)
        let mut broadcast_rx = self.state.broadcaster.client_registrieren(verbindungs_id);

        let dispatcher = EreignisDispatcher::neu(Arc::clone(&self.state));
        let mut ctx = DispatcherContext::neu(verbindungs_id);

        // Begruessung: der Client lernt seine Adresse
        if let Err(e) = framed
            .send(ServerEreignis::Connected {
                connection_id: verbindungs_id,
            })
            .await
        {
            tracing::warn!(peer = %peer_addr, fehler = %e, "Begruessung fehlgeschlagen");
            dispatcher.verbindung_trennen(&mut ctx).await;
            return;
        }

        loop {
            tokio::select! {
                // Eingehendes Ereignis vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(ereignis)) => {
                            tracing::trace!(
                                peer = %peer_addr,
                                verbindung = %verbindungs_id,
                                "Ereignis empfangen"
                            );

                            if let Some(antwort) = dispatcher.dispatch(ereignis, &mut ctx).await {
                                if let Err(e) = framed.send(antwort).await {
                                    tracing::warn!(
                                        peer = %peer_addr,
                                        fehler = %e,
                                        "Senden fehlgeschlagen"
                                    );
                                    break;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(
                                peer = %peer_addr,
                                fehler = %e,
                                "Frame-Lesefehler"
                            );
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehendes Ereignis aus dem Broadcaster
                Some(ausgehend) = broadcast_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(
                            peer = %peer_addr,
                            fehler = %e,
                            "Broadcast-Senden fehlgeschlagen"
                        );
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(
                            peer = %peer_addr,
                            "Shutdown-Signal – Verbindung wird getrennt"
                        );
                        let abschied = ServerEreignis::fehler("Server wird heruntergefahren");
                        let _ = framed.send(abschied).await;
                        break;
                    }
                }
            }
        }

        // Cleanup beim Verbindungsende
        dispatcher.verbindung_trennen(&mut ctx).await;

        tracing::info!(peer = %peer_addr, verbindung = %verbindungs_id, "Verbindungs-Task beendet");
    }
}
