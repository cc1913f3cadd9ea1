use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::config::DEFAULT_FILE_NAME;

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Produces the presentation bytes served by `/api/generate-pptx`.
pub type Generator = fn() -> crate::Result<Vec<u8>>;

pub fn router() -> Router {
    router_with(crate::generate)
}

pub fn router_with(generator: Generator) -> Router {
    Router::new()
        .route("/api/generate-pptx", get(move || generate_pptx(generator)))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn generate_pptx(generator: Generator) -> Response {
    match tokio::task::spawn_blocking(generator).await {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, PPTX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={DEFAULT_FILE_NAME}"),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(err)) => {
            error!(error = %err, "slide generation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate PPTX").into_response()
        }
        Err(err) => {
            error!(error = %err, "slide generation task aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate PPTX").into_response()
        }
    }
}
