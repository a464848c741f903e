//! SQLite-Implementierung des CodeRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use torwache_core::UserId;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::CodeRecord;
use crate::repository::CodeRepository;
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::users::zeitstempel;

#[async_trait]
impl CodeRepository for SqliteDb {
    async fn store_verification_code(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> crate::DbResult<CodeRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        // Beide Schritte in einer Transaktion: alte Codes verfallen genau
        // dann, wenn der neue sichtbar wird.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE verification_codes SET is_used = 1 WHERE user_id = ? AND is_used = 0")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO verification_codes (id, user_id, code, is_used, expires_at, created_at)
             VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(code)
        .bind(expires_at.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CodeRecord {
            id,
            user_id,
            code: code.to_string(),
            is_used: false,
            expires_at,
            created_at: now,
        })
    }

    async fn get_valid_code(&self, user_id: UserId) -> crate::DbResult<Option<CodeRecord>> {
        let row = sqlx::query(
            "SELECT id, user_id, code, is_used, expires_at, created_at
             FROM verification_codes
             WHERE user_id = ? AND is_used = 0
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        // Ablauf wird beim Lesen gefiltert; abgelaufene Codes bleiben stehen
        let record = row.map(|r| row_to_code(&r)).transpose()?;
        Ok(record.filter(|c| Utc::now() < c.expires_at))
    }

    async fn mark_code_used(&self, user_id: UserId) -> crate::DbResult<()> {
        sqlx::query("UPDATE verification_codes SET is_used = 1 WHERE user_id = ? AND is_used = 0")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_code(row: &sqlx::sqlite::SqliteRow) -> crate::DbResult<CodeRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let user_id_str: String = row.try_get("user_id")?;
    let user_id = UserId::parse(&user_id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{user_id_str}': {e}")))?;

    let is_used: i64 = row.try_get("is_used")?;

    Ok(CodeRecord {
        id,
        user_id,
        code: row.try_get("code")?,
        is_used: is_used != 0,
        expires_at: zeitstempel(row, "expires_at")?,
        created_at: zeitstempel(row, "created_at")?,
    })
}
