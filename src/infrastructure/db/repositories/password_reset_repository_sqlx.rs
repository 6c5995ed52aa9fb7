use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::password_reset_repository::{
    PasswordResetRepository, ResetTokenRow,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxPasswordResetRepository {
    pub pool: PgPool,
}

impl SqlxPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetRepository for SqlxPasswordResetRepository {
    async fn create_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<Uuid> {
        let row = sqlx::query(
            r#"INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
               VALUES ($1, $2, $3) RETURNING id"#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("id"))
    }

    async fn find_by_hash(&self, token_hash: &str) -> anyhow::Result<Option<ResetTokenRow>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, expires_at, used_at
               FROM password_reset_tokens WHERE token_hash = $1"#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| ResetTokenRow {
            id: r.get("id"),
            user_id: r.get("user_id"),
            expires_at: r.get("expires_at"),
            used_at: r.try_get("used_at").ok().flatten(),
        }))
    }

    async fn consume(&self, token_id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"UPDATE password_reset_tokens SET used_at = now()
               WHERE id = $1 AND used_at IS NULL
               RETURNING user_id"#,
        )
        .bind(token_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(false);
        };
        let user_id: Uuid = row.get("user_id");
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;
        if res.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }
}
