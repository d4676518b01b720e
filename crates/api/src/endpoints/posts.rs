//! Post endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use verdant_common::{AppResult, Page};
use verdant_core::CreatePostInput;
use verdant_db::entities::post;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub media_id: Option<String>,
    pub created_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            content: p.content,
            media_id: p.media_id,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Show/delete post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostActionRequest {
    pub post_id: String,
}

/// Feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(flatten)]
    pub page: Page,
}

/// List posts by author request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPostsRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub page: Page,
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&user.id, input).await?;

    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post (author only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&user.id, &req.post_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Show a post.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<PostActionRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get_by_id(&req.post_id).await?;

    Ok(ApiResponse::ok(post.into()))
}

/// Global feed, newest first.
async fn feed(
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .feed(req.page)
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// List posts by an author, newest first.
async fn by_author(
    State(state): State<AppState>,
    Json(req): Json<AuthorPostsRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .by_author(&req.user_id, req.page)
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/feed", post(feed))
        .route("/by-author", post(by_author))
}
