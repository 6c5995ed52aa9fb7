use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
    routing::post,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::auth::forgot_password::ForgotPassword;
use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterRequest as RegisterDto,
};
use crate::application::use_cases::auth::reset_password::ResetPassword;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::users::user::{Role, User};

use super::error::ApiError;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_listener: bool,
    #[serde(default)]
    pub is_creator: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub is_listener: bool,
    pub is_creator: bool,
    #[schema(value_type = String, example = "both")]
    pub role: Role,
    /// Absolute or relative URL of the avatar.
    pub profile_picture: Option<String>,
    pub header_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: User, cfg: &Config) -> Self {
        Self {
            role: user.role(),
            profile_picture: user.profile_picture.as_deref().map(|p| cfg.media_url(p)),
            header_image: user.header_image.as_deref().map(|p| cfg.media_url(p)),
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            is_listener: user.is_listener,
            is_creator: user.is_creator,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailResponse {
    pub detail: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    /// `access` or `refresh`.
    pub typ: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 201, body = UserResponse),
    (status = 400, description = "Invalid username, email or password"),
    (status = 409, description = "Username or email taken")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let dto = RegisterDto {
        username: req.username,
        email: req.email,
        password: req.password,
        is_listener: req.is_listener,
        is_creator: req.is_creator,
    };
    let user = uc.execute(&dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_user(user, &ctx.cfg)),
    ))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 401, description = "Invalid credentials")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let dto = LoginDto {
        username: req.username,
        password: req.password,
    };
    let user = uc.execute(&dto).await?.ok_or(ApiError::Unauthorized)?;
    let access = issue_token(&ctx.cfg, user.id, ACCESS, ctx.cfg.jwt_expires_secs)?;
    let refresh = issue_token(&ctx.cfg, user.id, REFRESH, ctx.cfg.jwt_refresh_expires_secs)?;
    tracing::info!(user_id = %user.id, "user_logged_in");
    Ok(Json(LoginResponse {
        access,
        refresh,
        user: UserResponse::from_user(user, &ctx.cfg),
    }))
}

#[utoipa::path(post, path = "/api/auth/refresh", tag = "Auth", request_body = RefreshRequest, security(()), responses(
    (status = 200, body = RefreshResponse),
    (status = 401, description = "Invalid or expired refresh token")
))]
pub async fn refresh(
    State(ctx): State<AppContext>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let user_id = decode_token(&ctx.cfg, &req.refresh, REFRESH)?;
    let access = issue_token(&ctx.cfg, user_id, ACCESS, ctx.cfg.jwt_expires_secs)?;
    Ok(Json(RefreshResponse { access }))
}

#[utoipa::path(post, path = "/api/auth/forgot-password", tag = "Auth", request_body = ForgotPasswordRequest, security(()), responses(
    (status = 200, body = DetailResponse)
))]
pub async fn forgot_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<DetailResponse>, ApiError> {
    let users = ctx.user_repo();
    let resets = ctx.password_resets();
    let uc = ForgotPassword {
        users: users.as_ref(),
        resets: resets.as_ref(),
        mailer: ctx.email_sender(),
        reset_url: &ctx.cfg.password_reset_url,
    };
    uc.execute(&req.email).await?;
    Ok(Json(DetailResponse {
        detail: "If an account exists for that email, a reset link has been sent.",
    }))
}

#[utoipa::path(post, path = "/api/auth/reset-password", tag = "Auth", request_body = ResetPasswordRequest, security(()), responses(
    (status = 200, body = DetailResponse),
    (status = 400, description = "Invalid token or weak password")
))]
pub async fn reset_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<DetailResponse>, ApiError> {
    let users = ctx.user_repo();
    let resets = ctx.password_resets();
    let uc = ResetPassword {
        users: users.as_ref(),
        resets: resets.as_ref(),
    };
    uc.execute(&req.token, &req.password).await?;
    Ok(Json(DetailResponse {
        detail: "Password has been reset.",
    }))
}

// --- Bearer extractor & JWT utils ---

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(|t| Bearer(t.trim().to_string()))
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Resolves an access token to the user id it was issued for.
pub(crate) fn validate_bearer(cfg: &Config, bearer: Bearer) -> Result<Uuid, StatusCode> {
    decode_token(cfg, &bearer.0, ACCESS)
}

fn issue_token(cfg: &Config, user_id: Uuid, typ: &str, ttl_secs: i64) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + ttl_secs).max(0) as usize,
        typ: typ.to_string(),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
    )?;
    Ok(token)
}

fn decode_token(cfg: &Config, token: &str, expected_typ: &str) -> Result<Uuid, StatusCode> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;
    if data.claims.typ != expected_typ {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Uuid::parse_str(&data.claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)
}
