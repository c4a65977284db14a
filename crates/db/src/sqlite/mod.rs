//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod calls;
pub mod participants;
pub mod pool;
pub mod rooms;

pub use pool::SqliteDb;
