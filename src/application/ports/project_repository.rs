use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::projects::project::{Project, ProjectSummary};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ProjectSummary>>;
    async fn insert(
        &self,
        user_id: Uuid,
        name: &str,
        data: &serde_json::Value,
    ) -> anyhow::Result<Project>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Project>>;
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        data: Option<&serde_json::Value>,
    ) -> anyhow::Result<Option<Project>>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
}
