//! SQLite-Implementierung des TeilnehmerRepository

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::TeilnehmerRecord;
use crate::repository::{DbResult, TeilnehmerRepository};
use crate::sqlite::pool::SqliteDb;

impl TeilnehmerRepository for SqliteDb {
    async fn add(&self, connection_id: &str, room_id: Uuid) -> DbResult<TeilnehmerRecord> {
        // Idempotent: ein doppelter Join derselben Verbindung in denselben
        // Raum laesst die bestehende Zeile unangetastet.
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO participants (id, connection_id, room_id, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(connection_id, room_id) DO NOTHING",
        )
        .bind(id.to_string())
        .bind(connection_id)
        .bind(room_id.to_string())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, connection_id, room_id, created_at
             FROM participants WHERE connection_id = ? AND room_id = ?",
        )
        .bind(connection_id)
        .bind(room_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        row_to_teilnehmer(&row)
    }

    async fn list_for_room(&self, room_id: Uuid) -> DbResult<Vec<TeilnehmerRecord>> {
        let rows = sqlx::query(
            "SELECT id, connection_id, room_id, created_at
             FROM participants WHERE room_id = ? ORDER BY created_at",
        )
        .bind(room_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_teilnehmer).collect()
    }

    async fn remove_by_connection(&self, connection_id: &str) -> DbResult<u64> {
        let affected = sqlx::query("DELETE FROM participants WHERE connection_id = ?")
            .bind(connection_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }

    async fn remove_from_room(&self, connection_id: &str, room_id: Uuid) -> DbResult<bool> {
        let affected =
            sqlx::query("DELETE FROM participants WHERE connection_id = ? AND room_id = ?")
                .bind(connection_id)
                .bind(room_id.to_string())
                .execute(&self.pool)
                .await?
                .rows_affected();
        Ok(affected > 0)
    }
}

pub(crate) fn row_to_teilnehmer(row: &sqlx::sqlite::SqliteRow) -> DbResult<TeilnehmerRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige Teilnehmer-UUID '{id_str}': {e}")))?;

    let room_str: String = row.try_get("room_id")?;
    let room_id = Uuid::parse_str(&room_str)
        .map_err(|e| DbError::intern(format!("Ungueltige room_id UUID '{room_str}': {e}")))?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| DbError::intern(format!("Ungueltige created_at '{created_at_str}': {e}")))?
        .with_timezone(&chrono::Utc);

    Ok(TeilnehmerRecord {
        id,
        connection_id: row.try_get("connection_id")?,
        room_id,
        created_at,
    })
}
