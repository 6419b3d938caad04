use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use processo_core::{CaseDocument, Preview, Sections};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ProcessPdfResponse {
    pub preview: Preview,
}

#[derive(Debug, Deserialize)]
pub struct ProcessAiRequest {
    #[serde(default)]
    pub sections: Sections,
    /// Artifact id returned in `Preview::page_image`.
    #[serde(default)]
    pub page_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessAiResponse {
    pub data: CaseDocument,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}
