//! User endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use verdant_common::AppResult;
use verdant_db::entities::user;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Public user representation.
///
/// `email` is only present when the caller is looking at themselves.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            email: Some(u.email),
            profile_picture: u.profile_picture,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

impl UserResponse {
    /// Strip fields a stranger should not see.
    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.email = None;
        self
    }
}

/// Show user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserRequest {
    pub user_id: String,
}

/// Update profile picture request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePictureRequest {
    pub media_id: Option<String>,
}

/// Show the current user.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Show a user by ID. The email is omitted unless the caller is
/// looking at their own record.
async fn show(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_by_id(&req.user_id).await?;

    let is_self = caller.is_some_and(|c| c.id == user.id);
    let resp = UserResponse::from(user);

    Ok(ApiResponse::ok(if is_self { resp } else { resp.redacted() }))
}

/// Set or clear the current user's profile picture.
async fn update_profile_picture(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfilePictureRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    if let Some(ref media_id) = req.media_id {
        state.media_service.get_by_id(media_id).await?;
    }

    let updated = state
        .user_service
        .set_profile_picture(&user.id, req.media_id)
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", post(me))
        .route("/show", post(show))
        .route("/update-profile-picture", post(update_profile_picture))
}
