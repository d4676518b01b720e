//! Business logic services.

#![allow(missing_docs)]

pub mod chat;
pub mod event;
pub mod group;
pub mod media;
pub mod post;
pub mod user;

pub use chat::{ChatService, SendMessageInput};
pub use event::{CreateEventInput, EventService};
pub use group::{CreateGroupInput, GroupService, UpdateGroupInput};
pub use media::{CreateMediaInput, MediaService, MAX_FILE_SIZE};
pub use post::{CreatePostInput, PostService};
pub use user::{LoginInput, RegisterInput, UserService};
