//! Group endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use verdant_common::{AppResult, Page};
use verdant_core::{CreateGroupInput, UpdateGroupInput};
use verdant_db::entities::{event, group, group_member};

use crate::{
    endpoints::users::UserResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

// ==================== Request/Response Types ====================

/// Group response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub creator_id: String,
    pub chat_id: String,
    pub picture: Option<String>,
    pub created_at: String,
}

impl From<group::Model> for GroupResponse {
    fn from(g: group::Model) -> Self {
        Self {
            id: g.id,
            name: g.name,
            creator_id: g.creator_id,
            chat_id: g.chat_id,
            picture: g.picture,
            created_at: g.created_at.to_rfc3339(),
        }
    }
}

/// Member response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    pub joined_at: String,
}

impl From<group_member::Model> for MemberResponse {
    fn from(m: group_member::Model) -> Self {
        Self {
            id: m.id,
            group_id: m.group_id,
            user_id: m.user_id,
            joined_at: m.joined_at.to_rfc3339(),
        }
    }
}

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub group_id: String,
    pub due_date: String,
    pub created_at: String,
}

impl From<event::Model> for EventResponse {
    fn from(e: event::Model) -> Self {
        Self {
            id: e.id,
            name: e.name,
            group_id: e.group_id,
            due_date: e.due_date.to_rfc3339(),
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Show group request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowGroupRequest {
    pub group_id: String,
}

/// Delete group request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGroupRequest {
    pub group_id: String,
}

/// List created groups request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroupsRequest {
    #[serde(flatten)]
    pub page: Page,
}

/// Join group request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    pub group_id: String,
}

/// Leave group request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveGroupRequest {
    pub group_id: String,
}

/// Paginated group association request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPageRequest {
    pub group_id: String,
    #[serde(flatten)]
    pub page: Page,
}

/// Admin grant/revoke request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActionRequest {
    pub group_id: String,
    pub user_id: String,
}

// ==================== Handlers ====================

/// Create a new group.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let group = state.group_service.create(&user.id, input).await?;

    Ok(ApiResponse::ok(group.into()))
}

/// Update a group's name or picture (admins only).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateGroupInput>,
) -> AppResult<ApiResponse<GroupResponse>> {
    if let Some(ref picture) = input.picture {
        state.media_service.get_by_id(picture).await?;
    }

    let group = state.group_service.update(&user.id, input).await?;

    Ok(ApiResponse::ok(group.into()))
}

/// Delete a group (creator only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteGroupRequest>,
) -> AppResult<ApiResponse<()>> {
    state.group_service.delete(&user.id, &req.group_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Show a group.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowGroupRequest>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let group = state.group_service.get_by_id(&req.group_id).await?;

    Ok(ApiResponse::ok(group.into()))
}

/// List groups created by the current user.
async fn created(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListGroupsRequest>,
) -> AppResult<ApiResponse<Vec<GroupResponse>>> {
    let groups = state
        .group_service
        .list_created(&user.id, req.page)
        .await?;

    Ok(ApiResponse::ok(
        groups.into_iter().map(Into::into).collect(),
    ))
}

/// Join a group.
async fn join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<JoinGroupRequest>,
) -> AppResult<ApiResponse<MemberResponse>> {
    let member = state.group_service.join(&user.id, &req.group_id).await?;

    Ok(ApiResponse::ok(member.into()))
}

/// Leave a group.
async fn leave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LeaveGroupRequest>,
) -> AppResult<ApiResponse<()>> {
    state.group_service.leave(&user.id, &req.group_id).await?;

    Ok(ApiResponse::ok(()))
}

/// List the admins of a group.
async fn admins(
    State(state): State<AppState>,
    Json(req): Json<GroupPageRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .group_service
        .admins(&req.group_id, req.page)
        .await?;

    Ok(ApiResponse::ok(
        users
            .into_iter()
            .map(|u| UserResponse::from(u).redacted())
            .collect(),
    ))
}

/// List the members of a group.
async fn members(
    State(state): State<AppState>,
    Json(req): Json<GroupPageRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .group_service
        .members(&req.group_id, req.page)
        .await?;

    Ok(ApiResponse::ok(
        users
            .into_iter()
            .map(|u| UserResponse::from(u).redacted())
            .collect(),
    ))
}

/// List the events of a group.
async fn events(
    State(state): State<AppState>,
    Json(req): Json<GroupPageRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state
        .group_service
        .events(&req.group_id, req.page)
        .await?;

    Ok(ApiResponse::ok(
        events.into_iter().map(Into::into).collect(),
    ))
}

/// Show the creator of a group.
async fn creator(
    State(state): State<AppState>,
    Json(req): Json<ShowGroupRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let group = state.group_service.get_by_id(&req.group_id).await?;
    let creator = state.group_service.creator(&group).await?;

    Ok(ApiResponse::ok(UserResponse::from(creator).redacted()))
}

/// Grant admin rights to a member.
async fn add_admin(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AdminActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .group_service
        .add_admin(&user.id, &req.group_id, &req.user_id)
        .await?;

    Ok(ApiResponse::ok(()))
}

/// Revoke admin rights from a member.
async fn remove_admin(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AdminActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .group_service
        .remove_admin(&user.id, &req.group_id, &req.user_id)
        .await?;

    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Group CRUD
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/created", post(created))
        // Membership
        .route("/join", post(join))
        .route("/leave", post(leave))
        // Associations
        .route("/admins", post(admins))
        .route("/members", post(members))
        .route("/events", post(events))
        .route("/creator", post(creator))
        // Admin rights
        .route("/admins/add", post(add_admin))
        .route("/admins/remove", post(remove_admin))
}
