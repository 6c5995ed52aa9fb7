use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::projects::create_project::CreateProject;
use crate::application::use_cases::projects::delete_project::DeleteProject;
use crate::application::use_cases::projects::get_project::GetProject;
use crate::application::use_cases::projects::list_projects::ListProjects;
use crate::application::use_cases::projects::update_project::UpdateProject;
use crate::bootstrap::app_context::AppContext;
use crate::domain::projects::project::{Project, ProjectSummary};
use crate::presentation::http::auth::{Bearer, validate_bearer};

use super::error::ApiError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectRequest {
    pub name: Option<String>,
    /// Workstation state; must be a JSON object.
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            data: p.data,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectListItem {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectSummary> for ProjectListItem {
    fn from(p: ProjectSummary) -> Self {
        Self {
            id: p.id,
            name: p.name,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project)
                .put(update_project)
                .patch(update_project)
                .delete(delete_project),
        )
        .with_state(ctx)
}

fn ensure_object(data: Option<&serde_json::Value>) -> Result<(), ApiError> {
    match data {
        Some(d) if !d.is_object() => Err(ApiError::BadRequest(
            "Project data must be a JSON object.".into(),
        )),
        _ => Ok(()),
    }
}

#[utoipa::path(get, path = "/api/auth/projects", tag = "Projects", responses(
    (status = 200, body = [ProjectListItem])
))]
pub async fn list_projects(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<ProjectListItem>>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.project_repo();
    let uc = ListProjects {
        repo: repo.as_ref(),
    };
    let items = uc.execute(user_id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/api/auth/projects", tag = "Projects", request_body = ProjectRequest, responses(
    (status = 201, body = ProjectResponse),
    (status = 400, description = "Data is not an object")
))]
pub async fn create_project(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Json(req): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    ensure_object(req.data.as_ref())?;
    let repo = ctx.project_repo();
    let uc = CreateProject {
        repo: repo.as_ref(),
    };
    let project = uc.execute(user_id, req.name.as_deref(), req.data).await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

#[utoipa::path(get, path = "/api/auth/projects/{id}", tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses((status = 200, body = ProjectResponse), (status = 404, description = "Not found")))]
pub async fn get_project(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.project_repo();
    let uc = GetProject {
        repo: repo.as_ref(),
    };
    let project = uc.execute(id, user_id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(project.into()))
}

#[utoipa::path(patch, path = "/api/auth/projects/{id}", tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = ProjectRequest,
    responses((status = 200, body = ProjectResponse), (status = 404, description = "Not found")))]
pub async fn update_project(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
    Json(req): Json<ProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    ensure_object(req.data.as_ref())?;
    let repo = ctx.project_repo();
    let uc = UpdateProject {
        repo: repo.as_ref(),
    };
    let project = uc
        .execute(id, user_id, req.name.as_deref(), req.data)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(project.into()))
}

#[utoipa::path(delete, path = "/api/auth/projects/{id}", tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses((status = 204), (status = 404, description = "Not found")))]
pub async fn delete_project(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.project_repo();
    let uc = DeleteProject {
        repo: repo.as_ref(),
    };
    if uc.execute(id, user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
