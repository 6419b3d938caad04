use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::artifacts::ArtifactKind;
use crate::models::error_response;
use crate::state::AppState;

pub async fn page_image(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.artifacts.read(&id, ArtifactKind::PageImage) {
        Some(bytes) => (
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::CONTENT_DISPOSITION, "inline; filename=\"pagina2.jpg\""),
            ],
            bytes,
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Imagem não encontrada"),
    }
}
