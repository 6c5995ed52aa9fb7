use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::publication_repository::{NewPublication, PublicationRepository};
use crate::domain::publications::publication::Publication;
use crate::infrastructure::db::PgPool;

const SELECT_JOINED: &str = r#"SELECT p.id, p.user_id, p.project_id, p.title, p.description,
       p.audio_file, p.cover_image, p.is_public, p.play_count, p.published_at,
       u.username, u.profile_picture AS author_picture
  FROM publications p
  JOIN users u ON u.id = p.user_id"#;

pub struct SqlxPublicationRepository {
    pub pool: PgPool,
}

impl SqlxPublicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_publication(r: &PgRow) -> Publication {
    Publication {
        id: r.get("id"),
        user_id: r.get("user_id"),
        project_id: r.try_get("project_id").ok().flatten(),
        title: r.get("title"),
        description: r.get("description"),
        audio_file: r.get("audio_file"),
        cover_image: r.try_get("cover_image").ok().flatten(),
        is_public: r.get("is_public"),
        play_count: r.get("play_count"),
        published_at: r.get("published_at"),
        username: r.get("username"),
        author_picture: r.try_get("author_picture").ok().flatten(),
    }
}

#[async_trait]
impl PublicationRepository for SqlxPublicationRepository {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Publication>> {
        let rows = sqlx::query(&format!(
            "{SELECT_JOINED} WHERE p.user_id = $1 ORDER BY p.published_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_publication).collect())
    }

    async fn insert(&self, new_pub: NewPublication<'_>) -> anyhow::Result<Publication> {
        let row = sqlx::query(
            r#"WITH inserted AS (
                 INSERT INTO publications
                   (id, user_id, project_id, title, description, audio_file, cover_image, is_public)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING *
               )
               SELECT i.id, i.user_id, i.project_id, i.title, i.description,
                      i.audio_file, i.cover_image, i.is_public, i.play_count, i.published_at,
                      u.username, u.profile_picture AS author_picture
                 FROM inserted i
                 JOIN users u ON u.id = i.user_id"#,
        )
        .bind(new_pub.id)
        .bind(new_pub.user_id)
        .bind(new_pub.project_id)
        .bind(new_pub.title)
        .bind(new_pub.description)
        .bind(new_pub.audio_file)
        .bind(new_pub.cover_image)
        .bind(new_pub.is_public)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_publication(&row))
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Publication>> {
        let row = sqlx::query(&format!(
            "{SELECT_JOINED} WHERE p.id = $1 AND p.user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_publication))
    }

    async fn increment_play_count(&self, id: Uuid) -> anyhow::Result<Option<i64>> {
        let row = sqlx::query(
            r#"UPDATE publications SET play_count = play_count + 1
               WHERE id = $1 AND is_public
               RETURNING play_count"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get("play_count")))
    }

    async fn list_public(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Publication>> {
        let rows = sqlx::query(&format!(
            "{SELECT_JOINED} WHERE p.is_public
             ORDER BY p.published_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_publication).collect())
    }

    async fn list_public_by_username(&self, username: &str) -> anyhow::Result<Vec<Publication>> {
        let rows = sqlx::query(&format!(
            "{SELECT_JOINED} WHERE p.is_public AND u.username = $1
             ORDER BY p.published_at DESC"
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_publication).collect())
    }

    async fn project_belongs_to(&self, project_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM projects WHERE id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
