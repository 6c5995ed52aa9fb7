use uuid::Uuid;

use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::Project;

use super::create_project::normalize_name;

pub struct UpdateProject<'a, R: ProjectRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProjectRepository + ?Sized> UpdateProject<'a, R> {
    // name/data: None => keep stored value
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        data: Option<serde_json::Value>,
    ) -> anyhow::Result<Option<Project>> {
        let name = name.map(|n| normalize_name(Some(n)));
        if let Some(d) = &data {
            anyhow::ensure!(d.is_object(), "project data must be a JSON object");
        }
        self.repo
            .update(id, user_id, name.as_deref(), data.as_ref())
            .await
    }
}
