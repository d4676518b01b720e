//! Request extractors.
//!
//! Both extractors read the user the auth middleware stashed in request
//! extensions. Rejections are `AppError` so missing auth produces the same
//! JSON error body as every other failure.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use verdant_common::AppError;
use verdant_db::entities::user;

/// Authenticated user extractor. Rejects with 401 when no user was
/// authenticated for this request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor. Never rejects; handlers that
/// vary their output by viewer use this.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}
