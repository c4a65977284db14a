//! SQLite-Implementierung des AnrufRepository
//!
//! Audio wird als geordnete Chunk-Zeilen gespeichert (eine INSERT pro
//! Append statt Blob-Neuschreiben); `load_audio` setzt die Aufnahme erst
//! beim Lesen zusammen.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{AnrufRecord, NeuerAnruf};
use crate::repository::{AnrufRepository, DbResult};
use crate::sqlite::pool::SqliteDb;

impl AnrufRepository for SqliteDb {
    async fn create(&self, data: NeuerAnruf<'_>) -> DbResult<AnrufRecord> {
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO calls
             (id, room_id, caller_id, receiver_id, started_at, ended_at, duration_secs, transcript)
             VALUES (?, ?, ?, ?, ?, NULL, 0, NULL)",
        )
        .bind(data.id.to_string())
        .bind(data.room_id.to_string())
        .bind(data.caller_id)
        .bind(data.receiver_id)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(AnrufRecord {
            id: data.id,
            room_id: data.room_id,
            caller_id: data.caller_id.to_string(),
            receiver_id: data.receiver_id.to_string(),
            started_at: now,
            ended_at: None,
            duration_secs: 0.0,
            transcript: None,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AnrufRecord>> {
        let row = sqlx::query(
            "SELECT id, room_id, caller_id, receiver_id, started_at, ended_at,
                    duration_secs, transcript
             FROM calls WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_anruf(&r)).transpose()
    }

    async fn get_active_for_room(&self, room_id: Uuid) -> DbResult<Option<AnrufRecord>> {
        let row = sqlx::query(
            "SELECT id, room_id, caller_id, receiver_id, started_at, ended_at,
                    duration_secs, transcript
             FROM calls WHERE room_id = ? AND ended_at IS NULL
             ORDER BY started_at DESC LIMIT 1",
        )
        .bind(room_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_anruf(&r)).transpose()
    }

    async fn mark_ended(
        &self,
        id: Uuid,
        ended_at: DateTime<Utc>,
        duration_secs: f64,
    ) -> DbResult<bool> {
        // Das UPDATE selbst ist der Wettlauf-Schutz: nur eine noch
        // offene Zeile wird markiert, der zweite Beender trifft 0 Zeilen
        let affected = sqlx::query(
            "UPDATE calls SET ended_at = ?, duration_secs = ?
             WHERE id = ? AND ended_at IS NULL",
        )
        .bind(ended_at.to_rfc3339())
        .bind(duration_secs)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    async fn append_audio_chunk(&self, call_id: Uuid, data: &[u8]) -> DbResult<()> {
        // Sequenznummer fortlaufend aus dem bisherigen Maximum; der Dienst
        // serialisiert Appends pro Anruf, damit die Reihenfolge der Ankunft
        // erhalten bleibt.
        sqlx::query(
            "INSERT INTO call_audio_chunks (call_id, seq, data)
             SELECT ?1, COALESCE(MAX(seq) + 1, 0), ?2
             FROM call_audio_chunks WHERE call_id = ?1",
        )
        .bind(call_id.to_string())
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_audio(&self, call_id: Uuid) -> DbResult<Option<Vec<u8>>> {
        use sqlx::Row as _;

        let rows = sqlx::query(
            "SELECT data FROM call_audio_chunks WHERE call_id = ? ORDER BY seq",
        )
        .bind(call_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut gesamt: Vec<u8> = Vec::new();
        for row in &rows {
            let chunk: Vec<u8> = row.try_get("data")?;
            gesamt.extend_from_slice(&chunk);
        }
        Ok(Some(gesamt))
    }
}

pub(crate) fn row_to_anruf(row: &sqlx::sqlite::SqliteRow) -> DbResult<AnrufRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige Anruf-UUID '{id_str}': {e}")))?;

    let room_str: String = row.try_get("room_id")?;
    let room_id = Uuid::parse_str(&room_str)
        .map_err(|e| DbError::intern(format!("Ungueltige room_id UUID '{room_str}': {e}")))?;

    let started_at_str: String = row.try_get("started_at")?;
    let started_at = chrono::DateTime::parse_from_rfc3339(&started_at_str)
        .map_err(|e| DbError::intern(format!("Ungueltige started_at '{started_at_str}': {e}")))?
        .with_timezone(&Utc);

    let ended_at_str: Option<String> = row.try_get("ended_at")?;
    let ended_at = ended_at_str
        .as_deref()
        .map(|s| {
            chrono::DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DbError::intern(format!("Ungueltige ended_at '{s}': {e}")))
        })
        .transpose()?;

    Ok(AnrufRecord {
        id,
        room_id,
        caller_id: row.try_get("caller_id")?,
        receiver_id: row.try_get("receiver_id")?,
        started_at,
        ended_at,
        duration_secs: row.try_get("duration_secs")?,
        transcript: row.try_get("transcript")?,
    })
}
