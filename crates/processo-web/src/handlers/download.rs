use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::artifacts::ArtifactKind;
use crate::models::error_response;
use crate::state::AppState;

pub async fn download_json(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.artifacts.read(&id, ArtifactKind::CaseJson) {
        Some(bytes) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"processo.json\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Arquivo não encontrado"),
    }
}
