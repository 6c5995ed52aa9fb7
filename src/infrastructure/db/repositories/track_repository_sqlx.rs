use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::track_repository::TrackRepository;
use crate::domain::tracks::track::Track;
use crate::infrastructure::db::PgPool;

pub struct SqlxTrackRepository {
    pub pool: PgPool,
}

impl SqlxTrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_track(r: &PgRow) -> Track {
    Track {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        audio_file: r.get("audio_file"),
        uploaded_at: r.get("uploaded_at"),
    }
}

#[async_trait]
impl TrackRepository for SqlxTrackRepository {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Track>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, title, audio_file, uploaded_at
               FROM tracks WHERE user_id = $1
               ORDER BY uploaded_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_track).collect())
    }

    async fn insert(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: &str,
        audio_file: &str,
    ) -> anyhow::Result<Track> {
        let row = sqlx::query(
            r#"INSERT INTO tracks (id, user_id, title, audio_file)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, title, audio_file, uploaded_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(audio_file)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_track(&row))
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Track>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, title, audio_file, uploaded_at
               FROM tracks WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_track))
    }

    async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        audio_file: Option<&str>,
    ) -> anyhow::Result<Option<Track>> {
        let row = sqlx::query(
            r#"UPDATE tracks
               SET title = COALESCE($2, title), audio_file = COALESCE($3, audio_file)
               WHERE id = $1
               RETURNING id, user_id, title, audio_file, uploaded_at"#,
        )
        .bind(id)
        .bind(title)
        .bind(audio_file)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_track))
    }
}
