//! funkraum-signaling – TCP-Relay fuer Walkie-Talkie-Clients
//!
//! Dieses Crate implementiert das Relay: es verwaltet TCP-Verbindungen,
//! Raum-Mitgliedschaften, leitet opake Negotiation-Payloads weiter und
//! koordiniert den Anruf-Lebenszyklus ueber die Dienste aus
//! `funkraum-calls`.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (RelayServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task, vergibt VerbindungsId)
//!     |
//!     v
//! EreignisDispatcher
//!     |
//!     +-- join-room / leave-room   (RaumDienst + Broadcaster)
//!     +-- signal                   (Unicast-Relay, Payload opak)
//!     +-- start-call / end-call    (AnrufDienst)
//!     +-- start-/stop-speaking     (Raum-Broadcast)
//!
//! EventBroadcaster – Ereignisse an Verbindungen und Raeume senden
//! ```

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod server_state;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use connection::ClientConnection;
pub use dispatcher::{DispatcherContext, EreignisDispatcher};
pub use error::{SignalingError, SignalingResult};
pub use server_state::{RelayConfig, RelayState};
pub use tcp::RelayServer;
