//! Authentication endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use verdant_common::AppResult;
use verdant_core::{LoginInput, RegisterInput};

use crate::{
    endpoints::users::UserResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Create a new user account.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.register(input).await?;

    Ok(ApiResponse::ok(user.into()))
}

/// Sign in to an existing account, issuing a session token.
async fn signin(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<ApiResponse<SigninResponse>> {
    let user = state.user_service.login(input).await?;

    Ok(ApiResponse::ok(SigninResponse {
        id: user.id.clone(),
        username: user.username,
        token: user.token.unwrap_or_default(),
    }))
}

/// Signout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Sign out, invalidating the current token.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.user_service.logout(&user.id).await?;

    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}
