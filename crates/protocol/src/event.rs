//! Relay-Ereignisse (Client <-> Server)
//!
//! ## Design
//! - Tagged Enums: `{"event": "join-room", "data": {...}}`
//! - Feldnamen in camelCase, Ereignisnamen in kebab-case (Wire-Kompatibilitaet
//!   zu bestehenden Clients)
//! - Signal-Payloads sind opak: `serde_json::Value`, wird nie interpretiert
//!   oder transformiert, nur woertlich weitergereicht
//! - Adressierungsfelder von Clients (`to`, `receiverSocketId`, `callId`)
//!   kommen als rohe Strings an; die Validierung passiert im Dispatcher,
//!   damit ein fehlerhafter Wert nie die Verbindung beendet

use funkraum_core::types::{AnrufId, VerbindungsId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Ereignisse die ein Client an den Server sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEreignis {
    /// Raum betreten (Raum wird bei Bedarf angelegt)
    #[serde(rename_all = "camelCase")]
    JoinRoom { room: String },

    /// Raum verlassen
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room: String },

    /// Negotiation-Payload an eine andere Verbindung weiterleiten
    #[serde(rename_all = "camelCase")]
    Signal {
        to: String,
        signal: serde_json::Value,
    },

    /// Anruf im Raum starten
    #[serde(rename_all = "camelCase")]
    StartCall {
        room: String,
        receiver_socket_id: String,
    },

    /// Anruf beenden
    #[serde(rename_all = "camelCase")]
    EndCall { call_id: String, room: String },

    /// Sprech-Beginn signalisieren
    #[serde(rename_all = "camelCase")]
    StartSpeaking { room: String },

    /// Sprech-Ende signalisieren
    #[serde(rename_all = "camelCase")]
    StopSpeaking { room: String },
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Ereignisse die der Server an Clients sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEreignis {
    /// Begruessung nach dem Accept: teilt dem Client seine VerbindungsId mit
    #[serde(rename_all = "camelCase")]
    Connected { connection_id: VerbindungsId },

    /// Eine Verbindung ist dem Raum beigetreten
    #[serde(rename_all = "camelCase")]
    UserJoined { connection_id: VerbindungsId },

    /// Eine Verbindung hat den Raum verlassen
    #[serde(rename_all = "camelCase")]
    UserLeft { connection_id: VerbindungsId },

    /// Weitergeleitete Negotiation-Payload
    #[serde(rename_all = "camelCase")]
    Signal {
        from: VerbindungsId,
        signal: serde_json::Value,
    },

    /// Anruf wurde gestartet (an den Anrufer)
    #[serde(rename_all = "camelCase")]
    CallStarted { call_id: AnrufId },

    /// Eingehender Anruf (an den Empfaenger)
    #[serde(rename_all = "camelCase")]
    IncomingCall {
        call_id: AnrufId,
        from: VerbindungsId,
    },

    /// Anruf wurde beendet (an beide Teilnehmer)
    #[serde(rename_all = "camelCase")]
    CallEnded { call_id: AnrufId },

    /// Sprech-Status einer Verbindung im Raum
    #[serde(rename_all = "camelCase")]
    SpeakingStatus {
        connection_id: VerbindungsId,
        is_speaking: bool,
    },

    /// Fehlermeldung an die ausloesende Verbindung
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

impl ServerEreignis {
    /// Erstellt ein Fehler-Ereignis
    pub fn fehler(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_ereignis_wire_format() {
        let json = r#"{"event":"join-room","data":{"room":"r1"}}"#;
        let ereignis: ClientEreignis = serde_json::from_str(json).unwrap();
        assert_eq!(ereignis, ClientEreignis::JoinRoom { room: "r1".into() });
    }

    #[test]
    fn start_call_feldnamen_camel_case() {
        let json = r#"{"event":"start-call","data":{"room":"r1","receiverSocketId":"abc"}}"#;
        let ereignis: ClientEreignis = serde_json::from_str(json).unwrap();
        assert_eq!(
            ereignis,
            ClientEreignis::StartCall {
                room: "r1".into(),
                receiver_socket_id: "abc".into(),
            }
        );
    }

    #[test]
    fn signal_payload_bleibt_opak() {
        let payload = json!({"type": "offer", "sdp": "v=0\r\no=- 42", "nested": [1, 2, {"x": null}]});
        let ereignis = ClientEreignis::Signal {
            to: VerbindungsId::new().to_string(),
            signal: payload.clone(),
        };

        let wire = serde_json::to_string(&ereignis).unwrap();
        let zurueck: ClientEreignis = serde_json::from_str(&wire).unwrap();
        match zurueck {
            ClientEreignis::Signal { signal, .. } => {
                assert_eq!(signal, payload, "Payload muss byte-genau erhalten bleiben")
            }
            _ => panic!("Falsches Ereignis"),
        }
    }

    #[test]
    fn server_ereignis_wire_format() {
        let id = VerbindungsId::new();
        let wire = serde_json::to_value(ServerEreignis::SpeakingStatus {
            connection_id: id,
            is_speaking: true,
        })
        .unwrap();

        assert_eq!(wire["event"], "speaking-status");
        assert_eq!(wire["data"]["connectionId"], id.to_string());
        assert_eq!(wire["data"]["isSpeaking"], true);
    }

    #[test]
    fn fehler_ereignis() {
        let wire = serde_json::to_value(ServerEreignis::fehler("kaputt")).unwrap();
        assert_eq!(wire["event"], "error");
        assert_eq!(wire["data"]["message"], "kaputt");
    }
}
