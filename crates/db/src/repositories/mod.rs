//! Repositories over the entity layer.
//!
//! Each repository wraps an `Arc<DatabaseConnection>` and exposes the typed
//! queries the services need. Database errors are mapped to
//! [`verdant_common::AppError::Database`] at this boundary.

pub mod chat;
pub mod event;
pub mod group;
pub mod media;
pub mod post;
pub mod user;

pub use chat::ChatRepository;
pub use event::EventRepository;
pub use group::GroupRepository;
pub use media::MediaRepository;
pub use post::PostRepository;
pub use user::UserRepository;
