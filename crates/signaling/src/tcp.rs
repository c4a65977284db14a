//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `RelayServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ClientConnection`.
//!
//! ## Concurrency-Modell
//! Da die Repository-Traits async fn ohne Send-Garantie verwenden
//! (async_fn_in_trait), laufen alle Verbindungs-Tasks in einer
//! `tokio::task::LocalSet` auf einem single-threaded Executor.

use funkraum_db::{AnrufRepository, RaumRepository, TeilnehmerRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::LocalSet;

use crate::connection::ClientConnection;
use crate::server_state::RelayState;

/// TCP-Relay-Server
///
/// Bindet einen TCP-Socket und akzeptiert Verbindungen in einer Loop.
/// Jede Verbindung wird als lokaler Task in der `LocalSet` ausgefuehrt.
pub struct RelayServer<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    state: Arc<RelayState<R>>,
    bind_addr: SocketAddr,
}

impl<R> RelayServer<R>
where
    R: RaumRepository + TeilnehmerRepository + AnrufRepository + 'static,
{
    /// Erstellt einen neuen RelayServer
    pub fn neu(state: Arc<RelayState<R>>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Startet den TCP-Listener und akzeptiert Verbindungen
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
    pub async fn starten(
        self,
        shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let local = LocalSet::new();
        local.run_until(self.accept_loop(shutdown_rx)).await
    }

    /// Interne Accept-Loop (laeuft innerhalb der LocalSet)
    async fn accept_loop(
        self,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        let lokale_addr = listener.local_addr()?;

        tracing::info!(adresse = %lokale_addr, "TCP Relay-Server gestartet");

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let verbunden = self.state.broadcaster.client_anzahl() as u32;
                            if verbunden >= self.state.config.max_verbindungen {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = self.state.config.max_verbindungen,
                                    "Server voll, Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            }

                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

                            let verbindung = ClientConnection::neu(
                                Arc::clone(&self.state),
                                peer_addr,
                            );
                            let shutdown_rx_clone = shutdown_rx.clone();

                            // Lokaler Task – kein Send erforderlich
                            tokio::task::spawn_local(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Relay-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!(uptime_sek = self.state.uptime_sek(), "TCP Relay-Server gestoppt");
        Ok(())
    }

    /// Gibt die Bind-Adresse zurueck
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
