use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::tracks::create_track::CreateTrack;
use crate::application::use_cases::tracks::delete_track::DeleteTrack;
use crate::application::use_cases::tracks::list_tracks::ListTracks;
use crate::application::use_cases::tracks::update_track::UpdateTrack;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::tracks::track::Track;
use crate::presentation::http::auth::{Bearer, validate_bearer};

use super::error::ApiError;
use super::forms::MultipartForm;

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackResponse {
    pub id: Uuid,
    pub title: String,
    pub audio_file: String,
    pub uploaded_at: DateTime<Utc>,
}

impl TrackResponse {
    fn from_track(t: Track, cfg: &Config) -> Self {
        Self {
            id: t.id,
            title: t.title,
            audio_file: cfg.media_url(&t.audio_file),
            uploaded_at: t.uploaded_at,
        }
    }
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct TrackMultipart {
    title: Option<String>,
    /// Required on create, optional on update.
    #[schema(value_type = Option<String>, format = Binary)]
    audio_file: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/tracks", get(list_tracks).post(create_track))
        .route("/tracks/:id", patch(update_track).delete(delete_track))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/auth/tracks", tag = "Tracks", responses(
    (status = 200, body = [TrackResponse])
))]
pub async fn list_tracks(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<TrackResponse>>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.track_repo();
    let uc = ListTracks {
        repo: repo.as_ref(),
    };
    let items = uc
        .execute(user_id)
        .await?
        .into_iter()
        .map(|t| TrackResponse::from_track(t, &ctx.cfg))
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/auth/tracks",
    tag = "Tracks",
    request_body(content = TrackMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = TrackResponse),
        (status = 400, description = "Missing title or invalid audio")
    )
)]
pub async fn create_track(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    multipart: Multipart,
) -> Result<(StatusCode, Json<TrackResponse>), ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let mut form = MultipartForm::read(multipart).await?;
    let audio = form.take_file("audio_file");
    let title = form.text("title").unwrap_or_default();

    let tracks = ctx.track_repo();
    let store = ctx.object_store();
    let slots = ctx.media_slots();
    let uc = CreateTrack {
        tracks: tracks.as_ref(),
        store: store.as_ref(),
        slots: slots.as_ref(),
        policies: ctx.media_policies(),
    };
    let track = uc.execute(user_id, title, audio).await?;
    Ok((
        StatusCode::CREATED,
        Json(TrackResponse::from_track(track, &ctx.cfg)),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/auth/tracks/{id}",
    tag = "Tracks",
    params(("id" = Uuid, Path, description = "Track ID")),
    request_body(content = TrackMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = TrackResponse),
        (status = 404, description = "Not found or not yours")
    )
)]
pub async fn update_track(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<TrackResponse>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let mut form = MultipartForm::read(multipart).await?;
    let audio = form.take_file("audio_file");

    let tracks = ctx.track_repo();
    let store = ctx.object_store();
    let slots = ctx.media_slots();
    let uc = UpdateTrack {
        tracks: tracks.as_ref(),
        store: store.as_ref(),
        slots: slots.as_ref(),
        policies: ctx.media_policies(),
    };
    let track = uc.execute(id, user_id, form.text("title"), audio).await?;
    Ok(Json(TrackResponse::from_track(track, &ctx.cfg)))
}

#[utoipa::path(
    delete,
    path = "/api/auth/tracks/{id}",
    tag = "Tracks",
    params(("id" = Uuid, Path, description = "Track ID")),
    responses(
        (status = 204, description = "Deleted with its audio"),
        (status = 404, description = "Not found or not yours")
    )
)]
pub async fn delete_track(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let tracks = ctx.track_repo();
    let store = ctx.object_store();
    let slots = ctx.media_slots();
    let uc = DeleteTrack {
        tracks: tracks.as_ref(),
        store: store.as_ref(),
        slots: slots.as_ref(),
        policies: ctx.media_policies(),
    };
    uc.execute(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
