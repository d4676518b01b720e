//! API endpoints.

mod auth;
mod chat;
mod events;
mod groups;
mod media;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

pub use users::UserResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/users", users::router())
        .nest("/groups", groups::router())
        .nest("/events", events::router())
        .nest("/posts", posts::router())
        .nest("/media", media::router())
        .nest("/chat", chat::router())
}
