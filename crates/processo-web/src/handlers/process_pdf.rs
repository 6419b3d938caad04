use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use processo_core::Preview;

use crate::artifacts::ArtifactKind;
use crate::models::{ProcessPdfResponse, error_response};
use crate::state::AppState;
use crate::upload;

/// Pre-AI stage: extract, split, and render the structured page.
pub async fn process_pdf(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let file = match upload::parse_multipart(multipart).await {
        Ok(file) => file,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    // Create a temp directory (auto-cleaned on drop)
    let temp_dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create temp directory: {}", e),
            );
        }
    };
    let pdf_path = temp_dir.path().join("upload.pdf");
    if let Err(e) = std::fs::write(&pdf_path, &file.data) {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to write temp file: {}", e),
        );
    }
    tracing::info!(filename = %file.filename, bytes = file.data.len(), "processing upload");

    let worker = Arc::clone(&state);
    let preview = tokio::task::spawn_blocking(move || {
        let pre = processo_ingest::preprocess(&pdf_path, &worker.pipeline);
        let page_image = store_page_image(&worker, &pdf_path, temp_dir.path());
        Preview::new(&pre.extraction, pre.sections, pre.heading_sections, page_image)
    })
    .await;

    match preview {
        Ok(preview) => Json(ProcessPdfResponse { preview }).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task join error: {}", e),
        ),
    }
}

/// Render the structured page into `scratch` and keep it as an artifact.
/// Rendering failures only drop the image from the preview.
fn store_page_image(state: &AppState, pdf: &Path, scratch: &Path) -> Option<String> {
    let image =
        match processo_ingest::render_structured_page(state.rasterizer.as_ref(), pdf, scratch) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "failed to render page image");
                return None;
            }
        };
    match state.artifacts.insert_file(ArtifactKind::PageImage, &image) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(error = %e, "failed to store page image");
            None
        }
    }
}
