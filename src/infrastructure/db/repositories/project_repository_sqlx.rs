use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::{Project, ProjectSummary};
use crate::infrastructure::db::PgPool;

pub struct SqlxProjectRepository {
    pub pool: PgPool,
}

impl SqlxProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_project(r: &PgRow) -> Project {
    Project {
        id: r.get("id"),
        user_id: r.get("user_id"),
        name: r.get("name"),
        data: r.get("data"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepository {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ProjectSummary>> {
        let rows = sqlx::query(
            r#"SELECT id, name, created_at, updated_at
               FROM projects WHERE user_id = $1
               ORDER BY updated_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ProjectSummary {
                id: r.get("id"),
                name: r.get("name"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
            .collect())
    }

    async fn insert(
        &self,
        user_id: Uuid,
        name: &str,
        data: &serde_json::Value,
    ) -> anyhow::Result<Project> {
        let row = sqlx::query(
            r#"INSERT INTO projects (user_id, name, data)
               VALUES ($1, $2, $3)
               RETURNING id, user_id, name, data, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(name)
        .bind(data)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_project(&row))
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Project>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, name, data, created_at, updated_at
               FROM projects WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_project))
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        data: Option<&serde_json::Value>,
    ) -> anyhow::Result<Option<Project>> {
        let row = sqlx::query(
            r#"UPDATE projects SET
                 name = COALESCE($3, name),
                 data = COALESCE($4, data),
                 updated_at = now()
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, name, data, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(data)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_project))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
