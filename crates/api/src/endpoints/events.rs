//! Event endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use verdant_common::{AppResult, Page};
use verdant_core::CreateEventInput;

use crate::{
    endpoints::groups::EventResponse, endpoints::users::UserResponse, extractors::AuthUser,
    middleware::AppState, response::ApiResponse,
};

/// Show event request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowEventRequest {
    pub event_id: String,
}

/// Join/leave event request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActionRequest {
    pub event_id: String,
}

/// Paginated participants request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsRequest {
    pub event_id: String,
    #[serde(flatten)]
    pub page: Page,
}

/// Create an event (group admins only).
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.create(&user.id, input).await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Delete an event (group admins only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.event_service.delete(&user.id, &req.event_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Show an event.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.get_by_id(&req.event_id).await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Join an event.
async fn join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.event_service.join(&user.id, &req.event_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Leave an event.
async fn leave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.event_service.leave(&user.id, &req.event_id).await?;

    Ok(ApiResponse::ok(()))
}

/// List the participants of an event.
async fn participants(
    State(state): State<AppState>,
    Json(req): Json<ParticipantsRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .event_service
        .participants(&req.event_id, req.page)
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
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/join", post(join))
        .route("/leave", post(leave))
        .route("/participants", post(participants))
}
