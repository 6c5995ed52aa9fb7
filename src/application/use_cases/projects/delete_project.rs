use uuid::Uuid;

use crate::application::ports::project_repository::ProjectRepository;

pub struct DeleteProject<'a, R: ProjectRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProjectRepository + ?Sized> DeleteProject<'a, R> {
    /// Publications made from the project keep existing with `project` unset.
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        self.repo.delete(id, user_id).await
    }
}
