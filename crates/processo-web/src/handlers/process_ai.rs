use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use processo_core::summary::{MISSING_IMAGE_MESSAGE, analyze_or_describe, summarize_or_describe};
use processo_core::{CaseDocument, CostBreakdown, ImageFormat};

use crate::artifacts::ArtifactKind;
use crate::models::{ProcessAiRequest, ProcessAiResponse, error_response};
use crate::state::AppState;

/// AI stage: describe the page image, summarise the facts, and keep the
/// resulting document for download. Provider failures end up as text in
/// the document, never as an error response.
pub async fn process_ai(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessAiRequest>,
) -> Response {
    let client = state.summarizer.as_ref();

    let image = req
        .page_image
        .as_deref()
        .and_then(|id| state.artifacts.read(id, ArtifactKind::PageImage));
    let (image_analysis, image_cost) = match image {
        Some(bytes) => {
            let outcome = analyze_or_describe(client, &bytes, ImageFormat::Jpeg.mime_type()).await;
            (outcome.text, outcome.cost)
        }
        None => (MISSING_IMAGE_MESSAGE.to_string(), None),
    };

    let facts = summarize_or_describe(client, &req.sections.facts).await;
    let costs = CostBreakdown::new(facts.cost, image_cost);
    tracing::info!(total_usd = costs.total_usd, "AI processing finished");

    let document = CaseDocument::new(&req.sections, facts.text)
        .with_image_analysis(image_analysis)
        .with_cost_breakdown(costs);

    let json = match serde_json::to_vec_pretty(&document) {
        Ok(json) => json,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize document: {}", e),
            );
        }
    };
    let id = match state.artifacts.insert_bytes(ArtifactKind::CaseJson, &json) {
        Ok(id) => id,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to store document: {}", e),
            );
        }
    };

    Json(ProcessAiResponse {
        data: document,
        download_url: format!("/api/download-json/{id}"),
    })
    .into_response()
}
