//! SQLite-Implementierung des RaumRepository

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::RaumRecord;
use crate::repository::{DbResult, RaumRepository};
use crate::sqlite::pool::SqliteDb;

impl RaumRepository for SqliteDb {
    async fn get_by_name(&self, name: &str) -> DbResult<Option<RaumRecord>> {
        let row = sqlx::query("SELECT id, name, created_at FROM rooms WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_raum(&r)).transpose()
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<RaumRecord>> {
        let row = sqlx::query("SELECT id, name, created_at FROM rooms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_raum(&r)).transpose()
    }

    async fn ensure(&self, name: &str) -> DbResult<RaumRecord> {
        // Der UNIQUE-Constraint auf `name` serialisiert den Anlege-Pfad:
        // bei gleichzeitigen Aufrufen gewinnt genau einer, alle anderen
        // lesen anschliessend die Zeile des Gewinners.
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO rooms (id, name, created_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(id.to_string())
        .bind(name)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get_by_name(name)
            .await?
            .ok_or_else(|| DbError::intern(format!("Raum '{name}' nach Ensure nicht lesbar")))
    }
}

pub(crate) fn row_to_raum(row: &sqlx::sqlite::SqliteRow) -> DbResult<RaumRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige Raum-UUID '{id_str}': {e}")))?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| DbError::intern(format!("Ungueltige created_at '{created_at_str}': {e}")))?
        .with_timezone(&chrono::Utc);

    Ok(RaumRecord {
        id,
        name: row.try_get("name")?,
        created_at,
    })
}
