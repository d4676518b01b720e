//! Chat endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use verdant_common::{AppResult, Page};
use verdant_core::SendMessageInput;
use verdant_db::entities::{chat_message, chat_room};

use crate::{
    endpoints::users::UserResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Chat room response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoomResponse {
    pub id: String,
    pub created_at: String,
}

impl From<chat_room::Model> for ChatRoomResponse {
    fn from(r: chat_room::Model) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Chat message response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: String,
    pub chat_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<chat_message::Model> for ChatMessageResponse {
    fn from(m: chat_message::Model) -> Self {
        Self {
            id: m.id,
            chat_id: m.chat_id,
            author_id: m.author_id,
            content: m.content,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Show room request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRoomRequest {
    pub chat_id: String,
}

/// Paginated room association request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPageRequest {
    pub chat_id: String,
    #[serde(flatten)]
    pub page: Page,
}

/// Create room request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Additional initial members besides the creator.
    #[serde(default)]
    pub member_ids: Vec<String>,
}

/// Join room request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub chat_id: String,
}

/// Create a chat room with the caller as a member.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> AppResult<ApiResponse<ChatRoomResponse>> {
    let mut member_ids = req.member_ids;
    if !member_ids.contains(&user.id) {
        member_ids.push(user.id);
    }

    let room = state.chat_service.create_room(&member_ids).await?;

    Ok(ApiResponse::ok(room.into()))
}

/// Join a chat room.
async fn join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<JoinRoomRequest>,
) -> AppResult<ApiResponse<()>> {
    state.chat_service.join(&user.id, &req.chat_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Show a chat room.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowRoomRequest>,
) -> AppResult<ApiResponse<ChatRoomResponse>> {
    let room = state.chat_service.get_room(&req.chat_id).await?;

    Ok(ApiResponse::ok(room.into()))
}

/// Send a message to a room (members only).
async fn send(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SendMessageInput>,
) -> AppResult<ApiResponse<ChatMessageResponse>> {
    let message = state.chat_service.send_message(&user.id, input).await?;

    Ok(ApiResponse::ok(message.into()))
}

/// List messages of a room, newest first (members only).
async fn messages(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RoomPageRequest>,
) -> AppResult<ApiResponse<Vec<ChatMessageResponse>>> {
    let messages = state
        .chat_service
        .messages(&user.id, &req.chat_id, req.page)
        .await?;

    Ok(ApiResponse::ok(
        messages.into_iter().map(Into::into).collect(),
    ))
}

/// List members of a room (members only).
async fn members(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RoomPageRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .chat_service
        .members(&user.id, &req.chat_id, req.page)
        .await?;

    Ok(ApiResponse::ok(
        users
            .into_iter()
            .map(|u| UserResponse::from(u).redacted())
            .collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/join", post(join))
        .route("/show", post(show))
        .route("/messages/send", post(send))
        .route("/messages", post(messages))
        .route("/members", post(members))
}
