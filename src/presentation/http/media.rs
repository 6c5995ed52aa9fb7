use axum::{
    Router,
    extract::{Path as AxumPath, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::bootstrap::app_context::AppContext;

#[utoipa::path(
    get,
    path = "/api/media/{path}",
    tag = "Media",
    params(("path" = String, Path, description = "Stored media path, e.g. profiles/avatars/<id>.png")),
    security(()),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No such file")
    )
)]
pub async fn serve_media(
    State(ctx): State<AppContext>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response, StatusCode> {
    let data = match ctx.object_store().get(&path).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(err) => {
            tracing::debug!(path = %path, error = ?err, "media_read_failed");
            return Err(StatusCode::NOT_FOUND);
        }
    };

    let content_type = mime_guess::from_path(&path).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_str(content_type.essence_str())
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        axum::http::header::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );

    Ok((headers, data).into_response())
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/*path", get(serve_media))
        .with_state(ctx)
}
