//! Entity definitions.

pub mod chat_member;
pub mod chat_message;
pub mod chat_room;
pub mod event;
pub mod event_participant;
pub mod group;
pub mod group_admin;
pub mod group_member;
pub mod media;
pub mod post;
pub mod user;

pub use chat_member::Entity as ChatMember;
pub use chat_message::Entity as ChatMessage;
pub use chat_room::Entity as ChatRoom;
pub use event::Entity as Event;
pub use event_participant::Entity as EventParticipant;
pub use group::Entity as Group;
pub use group_admin::Entity as GroupAdmin;
pub use group_member::Entity as GroupMember;
pub use media::Entity as Media;
pub use post::Entity as Post;
pub use user::Entity as User;
