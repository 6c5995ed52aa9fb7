use uuid::Uuid;

use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::ProjectSummary;

pub struct ListProjects<'a, R: ProjectRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProjectRepository + ?Sized> ListProjects<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Vec<ProjectSummary>> {
        self.repo.list_for_user(user_id).await
    }
}
