use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use sonara::bootstrap::app_context::{AppContext, AppServices};
use sonara::bootstrap::config::Config;
use sonara::presentation::http as web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            web::auth::register,
            web::auth::login,
            web::auth::refresh,
            web::auth::forgot_password,
            web::auth::reset_password,
            web::profile::get_profile,
            web::profile::update_profile,
            web::profile::delete_profile,
            web::tracks::list_tracks,
            web::tracks::create_track,
            web::tracks::update_track,
            web::tracks::delete_track,
            web::projects::list_projects,
            web::projects::create_project,
            web::projects::get_project,
            web::projects::update_project,
            web::projects::delete_project,
            web::publications::list_my_publications,
            web::publications::create_publication,
            web::publications::delete_publication,
            web::publications::record_play,
            web::publications::feed,
            web::publications::user_publications,
            web::media::serve_media,
            web::health::health,
        ),
        components(schemas(
            web::auth::RegisterRequest,
            web::auth::UserResponse,
            web::auth::LoginRequest,
            web::auth::LoginResponse,
            web::auth::RefreshRequest,
            web::auth::RefreshResponse,
            web::auth::ForgotPasswordRequest,
            web::auth::ResetPasswordRequest,
            web::auth::DetailResponse,
            web::profile::ProfileMultipart,
            web::tracks::TrackResponse,
            web::tracks::TrackMultipart,
            web::projects::ProjectRequest,
            web::projects::ProjectResponse,
            web::projects::ProjectListItem,
            web::publications::PublicationResponse,
            web::publications::PublicationMultipart,
            web::publications::PlayCountResponse,
            web::health::HealthResp,
        )),
        tags(
            (name = "Auth", description = "Registration, login and password reset"),
            (name = "Profile", description = "Current user profile and its images"),
            (name = "Tracks", description = "Uploaded audio tracks"),
            (name = "Projects", description = "Saved workstation projects"),
            (name = "Publications", description = "Published mixes and the public feed"),
            (name = "Media", description = "Stored media files"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

const CORS_METHODS: [http::Method; 6] = [
    http::Method::GET,
    http::Method::POST,
    http::Method::PUT,
    http::Method::DELETE,
    http::Method::PATCH,
    http::Method::OPTIONS,
];

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(CORS_METHODS)
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::header::AUTHORIZATION,
        ]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        Some(Err(_)) => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
        // FRONTEND_URL is enforced in production; deny all if it is still missing.
        None if cfg.is_production => base.allow_origin(AllowOrigin::exact(
            HeaderValue::from_static("http://invalid"),
        )),
        None => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "sonara=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        storage = ?cfg.storage_backend,
        production = cfg.is_production,
        "Starting Sonara backend"
    );

    // Database
    let pool = sonara::infrastructure::db::connect_pool(&cfg.database_url).await?;
    sonara::infrastructure::db::migrate(&pool).await?;

    let services = AppServices::from_config(&cfg, pool.clone()).await?;
    let ctx = AppContext::new(cfg.clone(), services);

    let api_router = Router::new()
        .nest("/api", web::health::routes(pool.clone()))
        .nest("/api/auth", web::auth::routes(ctx.clone()))
        .nest("/api/auth", web::profile::routes(ctx.clone()))
        .nest("/api/auth", web::tracks::routes(ctx.clone()))
        .nest("/api/auth", web::projects::routes(ctx.clone()))
        .nest("/api/auth", web::publications::routes(ctx.clone()))
        .nest("/api/media", web::media::routes(ctx.clone()))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        // Global body size limit for uploads (configurable)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, api_router)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(?e, "shutdown_signal_failed");
                }
                info!("Shutting down");
            })
            .await?;
        Ok(())
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }

    Ok(())
}
