use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::publications::create_publication::{
    CreatePublication, PublicationDraft,
};
use crate::application::use_cases::publications::delete_publication::DeletePublication;
use crate::application::use_cases::publications::list_feed::ListFeed;
use crate::application::use_cases::publications::list_mine::ListMyPublications;
use crate::application::use_cases::publications::list_user::ListUserPublications;
use crate::application::use_cases::publications::record_play::RecordPlay;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::publications::publication::Publication;
use crate::presentation::http::auth::{Bearer, validate_bearer};

use super::error::ApiError;
use super::forms::MultipartForm;

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicationResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub audio_file: String,
    pub cover_image: Option<String>,
    pub is_public: bool,
    pub play_count: i64,
    pub published_at: DateTime<Utc>,
    pub project: Option<Uuid>,
    pub username: String,
    /// Author avatar URL.
    pub profile_picture: Option<String>,
}

impl PublicationResponse {
    fn from_publication(p: Publication, cfg: &Config) -> Self {
        Self {
            audio_file: cfg.media_url(&p.audio_file),
            cover_image: p.cover_image.as_deref().map(|c| cfg.media_url(c)),
            profile_picture: p.author_picture.as_deref().map(|a| cfg.media_url(a)),
            id: p.id,
            title: p.title,
            description: p.description,
            is_public: p.is_public,
            play_count: p.play_count,
            published_at: p.published_at,
            project: p.project_id,
            username: p.username,
        }
    }
}

fn to_responses(items: Vec<Publication>, cfg: &Config) -> Vec<PublicationResponse> {
    items
        .into_iter()
        .map(|p| PublicationResponse::from_publication(p, cfg))
        .collect()
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PublicationMultipart {
    title: String,
    description: Option<String>,
    #[schema(value_type = String, format = Binary)]
    audio_file: String,
    #[schema(value_type = Option<String>, format = Binary)]
    cover_image: Option<String>,
    /// Stringy boolean; omitted means false.
    is_public: Option<String>,
    /// Project ID this mix was rendered from.
    project: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlayCountResponse {
    pub play_count: i64,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/publications",
            get(list_my_publications).post(create_publication),
        )
        .route("/publications/:id", delete(delete_publication))
        .route("/publications/:id/play", post(record_play))
        .route("/feed", get(feed))
        .route("/users/:username/publications", get(user_publications))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/auth/publications", tag = "Publications", responses(
    (status = 200, body = [PublicationResponse])
))]
pub async fn list_my_publications(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<PublicationResponse>>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.publication_repo();
    let uc = ListMyPublications {
        repo: repo.as_ref(),
    };
    let items = uc.execute(user_id).await?;
    Ok(Json(to_responses(items, &ctx.cfg)))
}

#[utoipa::path(
    post,
    path = "/api/auth/publications",
    tag = "Publications",
    request_body(content = PublicationMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = PublicationResponse),
        (status = 400, description = "Missing audio, invalid file or unknown project")
    )
)]
pub async fn create_publication(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PublicationResponse>), ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let form = MultipartForm::read(multipart).await?;
    let draft = publication_draft(form)?;

    let publications = ctx.publication_repo();
    let store = ctx.object_store();
    let slots = ctx.media_slots();
    let uc = CreatePublication {
        publications: publications.as_ref(),
        store: store.as_ref(),
        slots: slots.as_ref(),
        policies: ctx.media_policies(),
    };
    let publication = uc.execute(user_id, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(PublicationResponse::from_publication(publication, &ctx.cfg)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/auth/publications/{id}",
    tag = "Publications",
    params(("id" = Uuid, Path, description = "Publication ID")),
    responses(
        (status = 204, description = "Deleted with its audio and cover"),
        (status = 404, description = "Not found or not yours")
    )
)]
pub async fn delete_publication(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let publications = ctx.publication_repo();
    let store = ctx.object_store();
    let slots = ctx.media_slots();
    let uc = DeletePublication {
        publications: publications.as_ref(),
        store: store.as_ref(),
        slots: slots.as_ref(),
        policies: ctx.media_policies(),
    };
    uc.execute(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/auth/publications/{id}/play",
    tag = "Publications",
    params(("id" = Uuid, Path, description = "Publication ID")),
    security(()),
    responses(
        (status = 200, body = PlayCountResponse),
        (status = 404, description = "Not found or not public")
    )
)]
pub async fn record_play(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayCountResponse>, ApiError> {
    let repo = ctx.publication_repo();
    let uc = RecordPlay {
        repo: repo.as_ref(),
    };
    let play_count = uc.execute(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(PlayCountResponse { play_count }))
}

#[utoipa::path(
    get,
    path = "/api/auth/feed",
    tag = "Publications",
    params(FeedQuery),
    security(()),
    responses((status = 200, body = [PublicationResponse]))
)]
pub async fn feed(
    State(ctx): State<AppContext>,
    Query(q): Query<FeedQuery>,
) -> Result<Json<Vec<PublicationResponse>>, ApiError> {
    let repo = ctx.publication_repo();
    let uc = ListFeed {
        repo: repo.as_ref(),
    };
    let items = uc.execute(q.limit, q.offset).await?;
    Ok(Json(to_responses(items, &ctx.cfg)))
}

#[utoipa::path(
    get,
    path = "/api/auth/users/{username}/publications",
    tag = "Publications",
    params(("username" = String, Path, description = "Author username")),
    security(()),
    responses((status = 200, body = [PublicationResponse]))
)]
pub async fn user_publications(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
) -> Result<Json<Vec<PublicationResponse>>, ApiError> {
    let repo = ctx.publication_repo();
    let uc = ListUserPublications {
        repo: repo.as_ref(),
    };
    let items = uc.execute(&username).await?;
    Ok(Json(to_responses(items, &ctx.cfg)))
}

fn publication_draft(mut form: MultipartForm) -> Result<PublicationDraft, ApiError> {
    let project_id = match form.text("project").map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::BadRequest("Invalid project id.".into()))?,
        ),
    };
    Ok(PublicationDraft {
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        is_public: form.flag("is_public"),
        project_id,
        audio_file: form.take_file("audio_file"),
        cover_image: form.take_file("cover_image"),
    })
}
