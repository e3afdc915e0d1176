use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    infrastructure::middleware::Viewer,
};

const FILE_FIELD: &str = "file";

/// `POST /medias`: multipart upload with the image in the `file` field
pub async fn upload_media_handler(
    State(state): State<AppState>,
    _viewer: Viewer,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadMedia(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadMedia(e.body_text()))?;

        let media_id = state
            .content
            .upload_media(&filename, content_type.as_deref(), &bytes)
            .await?;
        return Ok(Json(json!({ "result": true, "media_id": media_id })));
    }

    Err(AppError::Validation(format!(
        "multipart field '{}' is required",
        FILE_FIELD
    )))
}
