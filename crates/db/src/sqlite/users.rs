//! SQLite-Implementierung des UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use torwache_core::UserId;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{BenutzerRecord, BenutzerUpdate, NeuerBenutzer};
use crate::repository::UserRepository;
use crate::sqlite::pool::SqliteDb;

const BENUTZER_SPALTEN: &str =
    "id, email, password_hash, signature, is_confirmed, created_at, updated_at, deleted_at";

#[async_trait]
impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> crate::DbResult<BenutzerRecord> {
        let id = UserId::new();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, is_confirmed, created_at, updated_at)
             VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.email)
        .bind(data.password_hash)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("unique") {
                DbError::Eindeutigkeit(format!("E-Mail '{}' bereits vergeben", data.email))
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(BenutzerRecord {
            id,
            email: data.email.to_string(),
            password_hash: data.password_hash.to_string(),
            signatur: None,
            is_confirmed: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    async fn get_by_id(&self, id: UserId) -> crate::DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {BENUTZER_SPALTEN} FROM users WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> crate::DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {BENUTZER_SPALTEN} FROM users WHERE email = ? AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update(&self, id: UserId, data: BenutzerUpdate) -> crate::DbResult<BenutzerRecord> {
        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.email.is_some() {
            sets.push("email = ?");
        }
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }
        if data.is_confirmed.is_some() {
            sets.push("is_confirmed = ?");
        }

        if sets.is_empty() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("Benutzer {id}")));
        }
        sets.push("updated_at = ?");

        let sql = format!(
            "UPDATE users SET {} WHERE id = ? AND deleted_at IS NULL",
            sets.join(", ")
        );
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.email {
            q = q.bind(v);
        }
        if let Some(ref v) = data.password_hash {
            q = q.bind(v);
        }
        if let Some(v) = data.is_confirmed {
            q = q.bind(v as i64);
        }
        q = q.bind(Utc::now().to_rfc3339());
        q = q.bind(id.to_string());

        let affected = q.execute(&self.pool).await?.rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Benutzer {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Benutzer nach Update nicht gefunden"))
    }

    async fn soft_delete(&self, id: UserId) -> crate::DbResult<bool> {
        let now = Utc::now().to_rfc3339();
        let affected = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    async fn get_email_by_signature(&self, signatur: Uuid) -> crate::DbResult<Option<String>> {
        let row = sqlx::query(
            "SELECT email FROM users WHERE signature = ? AND deleted_at IS NULL",
        )
        .bind(signatur.to_string())
        .fetch_optional(&self.pool)
        .await?;

        use sqlx::Row as _;
        Ok(row.map(|r| r.try_get("email")).transpose()?)
    }

    async fn set_signature(&self, id: UserId, signatur: Uuid) -> crate::DbResult<()> {
        let affected = sqlx::query(
            "UPDATE users SET signature = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(signatur.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Benutzer {id}")));
        }
        Ok(())
    }
}

pub(crate) fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> crate::DbResult<BenutzerRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = UserId::parse(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let signatur: Option<String> = row.try_get("signature")?;
    let signatur = signatur
        .as_deref()
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|e| DbError::intern(format!("Ungueltige Signatur '{s}': {e}")))
        })
        .transpose()?;

    let is_confirmed: i64 = row.try_get("is_confirmed")?;

    Ok(BenutzerRecord {
        id,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        signatur,
        is_confirmed: is_confirmed != 0,
        created_at: zeitstempel(row, "created_at")?,
        updated_at: zeitstempel(row, "updated_at")?,
        deleted_at: zeitstempel_optional(row, "deleted_at")?,
    })
}

pub(crate) fn zeitstempel(
    row: &sqlx::sqlite::SqliteRow,
    spalte: &str,
) -> crate::DbResult<DateTime<Utc>> {
    use sqlx::Row as _;
    let s: String = row.try_get(spalte)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltiger Zeitstempel '{s}' in {spalte}: {e}")))
}

pub(crate) fn zeitstempel_optional(
    row: &sqlx::sqlite::SqliteRow,
    spalte: &str,
) -> crate::DbResult<Option<DateTime<Utc>>> {
    use sqlx::Row as _;
    let s: Option<String> = row.try_get(spalte)?;
    s.as_deref()
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    DbError::intern(format!("Ungueltiger Zeitstempel '{s}' in {spalte}: {e}"))
                })
        })
        .transpose()
}
