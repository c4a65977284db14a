//! funkraum-db – Entity-Store
//!
//! Dieses Crate stellt das Repository-Pattern bereit, das den durablen
//! Zustand des Relays (Raeume, Teilnehmer, Anrufe, Audio-Chunks) hinter
//! einer einheitlichen Schnittstelle abstrahiert. Die konkrete
//! Implementierung laeuft auf SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{AnrufRepository, DatabaseConfig, DbResult, RaumRepository, TeilnehmerRepository};
pub use sqlite::SqliteDb;
