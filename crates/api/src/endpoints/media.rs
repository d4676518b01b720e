//! Media endpoints for file uploads.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use verdant_common::{AppError, AppResult};
use verdant_core::{CreateMediaInput, MAX_FILE_SIZE};
use verdant_db::entities::media;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Media response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: Option<media::MediaType>,
    pub created_at: String,
}

impl From<media::Model> for MediaResponse {
    fn from(m: media::Model) -> Self {
        Self {
            id: m.id,
            url: m.url,
            media_type: m.media_type,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Show/delete media request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaActionRequest {
    pub media_id: String,
}

/// Upload a file via multipart form.
async fn upload(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<MediaResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(std::string::ToString::to_string);
                content_type = field.content_type().map(std::string::ToString::to_string);
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?
                        .to_vec(),
                );
            }
            "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.is_empty() {
                    file_name = Some(text);
                }
            }
            _ => {}
        }
    }

    let data =
        file_data.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let input = CreateMediaInput {
        name: file_name.unwrap_or_else(|| "unnamed".to_string()),
        content_type: content_type
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        data,
    };

    let media = state.media_service.upload(&user.id, input).await?;

    Ok(ApiResponse::ok(media.into()))
}

/// Show a media record.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<MediaActionRequest>,
) -> AppResult<ApiResponse<MediaResponse>> {
    let media = state.media_service.get_by_id(&req.media_id).await?;

    Ok(ApiResponse::ok(media.into()))
}

/// Delete a media record together with its stored file (uploader only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MediaActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.media_service.delete(&user.id, &req.media_id).await?;

    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Room for multipart framing on top of the file itself.
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/show", post(show))
        .route("/delete", post(delete))
}
