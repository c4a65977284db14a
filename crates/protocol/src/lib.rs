//! funkraum-protocol – Ereignistypen und Wire-Format
//!
//! Dieses Crate definiert die Relay-Ereignisse die zwischen Client und
//! Server ausgetauscht werden sowie das frame-basierte TCP-Wire-Format.

pub mod event;
pub mod wire;

pub use event::{ClientEreignis, ServerEreignis};
pub use wire::FrameCodec;
