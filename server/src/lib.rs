//! funkraum-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Dienste, TCP-Relay und HTTP-Schnittstelle zu
//! einem lauffaehigen Server.

pub mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;

use config::ServerConfig;
use funkraum_api::{ApiState, RestServer, RestServerKonfig};
use funkraum_calls::{AnrufDienst, RaumDienst, SitzungsRegister};
use funkraum_db::{DatabaseConfig, SqliteDb};
use funkraum_signaling::{RelayConfig, RelayServer, RelayState};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbankverbindung herstellen, Migrationen ausfuehren
    /// 2. Dienste aufbauen (Raum, Anruf)
    /// 3. HTTP-Schnittstelle starten
    /// 4. TCP-Relay starten (laeuft im aktuellen Task, LocalSet)
    /// 5. Ctrl-C loest den koordinierten Shutdown aus
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            relay = %self.config.relay_bind_adresse(),
            http = %self.config.http_bind_adresse(),
            "Server startet"
        );

        // Datenbank
        let db_config = DatabaseConfig {
            url: self.config.datenbank.url.clone(),
            max_verbindungen: self.config.datenbank.max_verbindungen,
            sqlite_wal: self.config.datenbank.wal,
        };
        let db = Arc::new(
            SqliteDb::oeffnen(&db_config)
                .await
                .context("Datenbankverbindung fehlgeschlagen")?,
        );
        db.migrationen_ausfuehren()
            .await
            .context("Migrationen fehlgeschlagen")?;
        tracing::info!(url = %db_config.url, "Datenbank bereit");

        // Dienste
        let raum_dienst = RaumDienst::neu(db.clone());
        let anruf_dienst = AnrufDienst::neu(db, SitzungsRegister::neu());

        // Shutdown-Koordination
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let signal_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = signal_tx.send(true);
            }
        });

        // HTTP-Schnittstelle
        let http_addr: SocketAddr = self
            .config
            .http_bind_adresse()
            .parse()
            .context("Ungueltige HTTP-Bind-Adresse")?;
        let rest = RestServer::neu(RestServerKonfig {
            bind_addr: http_addr,
            cors_origins: self.config.http.cors_origins.clone(),
        });
        let api_state = ApiState::neu(raum_dienst.clone(), anruf_dienst.clone());
        let http_task = tokio::spawn(rest.starten(api_state, shutdown_rx.clone()));

        // TCP-Relay (LocalSet, laeuft im aktuellen Task)
        let relay_addr: SocketAddr = self
            .config
            .relay_bind_adresse()
            .parse()
            .context("Ungueltige Relay-Bind-Adresse")?;
        let relay_state = RelayState::neu(
            RelayConfig {
                max_verbindungen: self.config.server.max_verbindungen,
                max_frame_groesse: self.config.netzwerk.max_frame_groesse,
            },
            raum_dienst,
            anruf_dienst,
        );
        let relay = RelayServer::neu(relay_state, relay_addr);
        relay
            .starten(shutdown_rx)
            .await
            .context("Relay-Server fehlgeschlagen")?;

        // HTTP-Server zu Ende laufen lassen
        http_task
            .await
            .context("HTTP-Task abgebrochen")?
            .context("HTTP-Server fehlgeschlagen")?;

        tracing::info!("Server beendet");
        Ok(())
    }
}
