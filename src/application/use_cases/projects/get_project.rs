use uuid::Uuid;

use crate::application::ports::project_repository::ProjectRepository;
use crate::domain::projects::project::Project;

pub struct GetProject<'a, R: ProjectRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProjectRepository + ?Sized> GetProject<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Project>> {
        self.repo.get(id, user_id).await
    }
}
