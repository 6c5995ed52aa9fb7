use uuid::Uuid;

use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::{DEFAULT_PROJECT_NAME, Project};

pub struct CreateProject<'a, R: ProjectRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProjectRepository + ?Sized> CreateProject<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        data: Option<serde_json::Value>,
    ) -> anyhow::Result<Project> {
        let name = normalize_name(name);
        let data = data.unwrap_or_else(|| serde_json::json!({}));
        anyhow::ensure!(data.is_object(), "project data must be a JSON object");
        self.repo.insert(user_id, &name, &data).await
    }
}

pub(crate) fn normalize_name(name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.chars().take(255).collect(),
        None => DEFAULT_PROJECT_NAME.to_string(),
    }
}
