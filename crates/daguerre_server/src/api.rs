//! HTTP surface for serving media.

use crate::{Authorization, CacheFill, MediaCatalog};
use axum::{
    Router,
    body::Body,
    extract::{Path, Request, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Json, Response},
    routing::get,
};
use daguerre_storage::{MediaFile, RepositoryReader};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

/// Cache header sent with every served artifact.
pub const CACHE_CONTROL_VALUE: &str = "private, max-age=86400, immutable";

/// Shared state of the media router.
#[derive(Clone)]
pub struct ApiState {
    catalog: Arc<dyn MediaCatalog>,
    cache: Arc<CacheFill>,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(catalog: Arc<dyn MediaCatalog>, cache: Arc<CacheFill>) -> Self {
        Self { catalog, cache }
    }
}

/// Creates the media router: `GET /:name` and `GET /health`.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/:name", get(serve_media))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404").into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

/// Serve one media artifact, regenerating it first if it is missing.
#[tracing::instrument(skip(state, request))]
async fn serve_media(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    request: Request,
) -> Response {
    let url = match state.catalog.lookup(&name).await {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, "Unknown media");
            return not_found();
        }
    };

    let headers = request.headers().clone();
    match state.catalog.authorize(&url.media, &headers).await {
        Ok(Authorization::Granted) => {}
        Ok(Authorization::Denied { status, message }) => {
            return (status, message).into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Error authenticating media");
            return internal_error();
        }
    }

    let cached_path = match state.catalog.cached_path(&url) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, "Could not resolve cached path");
            return internal_error();
        }
    };

    let artifact = match state.cache.ensure(&url.media, &cached_path).await {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::error!(error = %e, "Cached media unavailable");
            return internal_error();
        }
    };

    let mut response = serve(artifact.reader.as_ref(), &cached_path, request).await;
    let status = response.status();
    if status.is_success() || status == StatusCode::NOT_MODIFIED {
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE));
    }
    response
}

/// Hand the artifact to the best serving primitive the backend supports.
///
/// Native files get range and conditional requests; object-store streams are
/// sent whole, front to back.
async fn serve(reader: &dyn RepositoryReader, cached_path: &str, request: Request) -> Response {
    if reader.serves_native_files() {
        return match ServeFile::new(cached_path).oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        };
    }

    match reader.open(cached_path).await {
        Ok(file) => stream_response(file, cached_path),
        Err(e) => {
            tracing::error!(error = %e, backend = %reader.backend(), "Could not open cached media");
            internal_error()
        }
    }
}

fn stream_response(file: MediaFile, cached_path: &str) -> Response {
    let mime = mime_guess::from_path(cached_path).first_or_octet_stream();
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime.as_ref());
    if let Some(size) = file.size() {
        builder = builder.header(CONTENT_LENGTH, size);
    }
    builder
        .body(Body::from_stream(file.into_stream()))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Could not build media response");
            internal_error()
        })
}
