use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::get,
};
use utoipa::ToSchema;

use crate::application::use_cases::auth::delete_account::DeleteAccount;
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::profile::update_profile::{ProfileUpdate, UpdateProfile};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, UserResponse, validate_bearer};

use super::error::ApiError;
use super::forms::MultipartForm;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProfileMultipart {
    bio: Option<String>,
    /// Stringy boolean; omitted means false.
    is_listener: Option<String>,
    is_creator: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    profile_picture: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    header_image: Option<String>,
    remove_profile_picture: Option<String>,
    remove_header_image: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/profile",
            get(get_profile).patch(update_profile).delete(delete_profile),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/auth/profile", tag = "Profile", responses(
    (status = 200, body = UserResponse),
    (status = 401, description = "Missing or invalid access token")
))]
pub async fn get_profile(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let user = uc.execute(user_id).await?.ok_or(ApiError::Unauthorized)?;
    Ok(Json(UserResponse::from_user(user, &ctx.cfg)))
}

#[utoipa::path(
    patch,
    path = "/api/auth/profile",
    tag = "Profile",
    request_body(content = ProfileMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, description = "Invalid image"),
        (status = 502, description = "File storage unavailable")
    )
)]
pub async fn update_profile(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let form = MultipartForm::read(multipart).await?;
    let update = profile_update(form);

    let users = ctx.user_repo();
    let store = ctx.object_store();
    let slots = ctx.media_slots();
    let uc = UpdateProfile {
        users: users.as_ref(),
        store: store.as_ref(),
        slots: slots.as_ref(),
        policies: ctx.media_policies(),
    };
    let user = uc.execute(user_id, update).await?;
    Ok(Json(UserResponse::from_user(user, &ctx.cfg)))
}

#[utoipa::path(delete, path = "/api/auth/profile", tag = "Profile", responses(
    (status = 204, description = "Account and its media deleted"),
    (status = 404, description = "Account already gone")
))]
pub async fn delete_profile(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let store = ctx.object_store();
    let slots = ctx.media_slots();
    let uc = DeleteAccount {
        store: store.as_ref(),
        slots: slots.as_ref(),
        policies: ctx.media_policies(),
    };
    uc.execute(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn profile_update(mut form: MultipartForm) -> ProfileUpdate {
    ProfileUpdate {
        bio: form.text("bio").map(str::to_string),
        is_listener: form.flag("is_listener"),
        is_creator: form.flag("is_creator"),
        remove_profile_picture: form.flag("remove_profile_picture"),
        remove_header_image: form.flag("remove_header_image"),
        profile_picture: form.take_file("profile_picture"),
        header_image: form.take_file("header_image"),
    }
}
