//! PDF upload endpoint feeding the document intake pipeline.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use record_store::RecordStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub data: String,
}

/// POST /orders/upload-pdf — run the intake pipeline over an uploaded file.
///
/// Expects a multipart body with a `file` field; its declared content type
/// is handed to the pipeline unchanged.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_pdf<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let media_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            file = Some((media_type, data.to_vec()));
            break;
        }
    }

    let (media_type, data) = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let text = state.intake.process(&data, &media_type).await?;

    Ok(Json(UploadResponse {
        success: true,
        data: text,
    }))
}
