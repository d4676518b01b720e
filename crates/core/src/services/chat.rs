//! Chat service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use verdant_common::{AppError, AppResult, IdGenerator, Page};
use verdant_db::entities::{chat_member, chat_message, chat_room, user};
use verdant_db::repositories::ChatRepository;

/// Input for sending a chat message.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub chat_id: String,
    #[validate(length(min = 1, max = 4096))]
    pub content: String,
}

/// Service for chat rooms and messages.
#[derive(Clone)]
pub struct ChatService {
    chat_repo: ChatRepository,
    id_gen: IdGenerator,
}

impl ChatService {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(chat_repo: ChatRepository) -> Self {
        Self {
            chat_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a chat room by ID.
    pub async fn get_room(&self, id: &str) -> AppResult<chat_room::Model> {
        self.chat_repo.get_room(id).await
    }

    /// Create a chat room with the given initial members.
    pub async fn create_room(&self, member_ids: &[String]) -> AppResult<chat_room::Model> {
        let now = Utc::now();
        let room = self
            .chat_repo
            .create_room(chat_room::ActiveModel {
                id: Set(self.id_gen.generate()),
                created_at: Set(now.into()),
            })
            .await?;

        for user_id in member_ids {
            self.chat_repo
                .add_member(chat_member::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    chat_id: Set(room.id.clone()),
                    user_id: Set(user_id.clone()),
                    joined_at: Set(now.into()),
                })
                .await?;
        }

        Ok(room)
    }

    /// Join a chat room.
    pub async fn join(&self, user_id: &str, chat_id: &str) -> AppResult<chat_member::Model> {
        self.chat_repo.get_room(chat_id).await?;

        if self.chat_repo.is_member(user_id, chat_id).await? {
            return Err(AppError::Conflict(format!(
                "Already a member of chat '{chat_id}'"
            )));
        }

        self.chat_repo
            .add_member(chat_member::ActiveModel {
                id: Set(self.id_gen.generate()),
                chat_id: Set(chat_id.to_string()),
                user_id: Set(user_id.to_string()),
                joined_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Send a message. The author must be a member of the room.
    pub async fn send_message(
        &self,
        author_id: &str,
        input: SendMessageInput,
    ) -> AppResult<chat_message::Model> {
        input.validate()?;

        self.require_member(author_id, &input.chat_id).await?;

        self.chat_repo
            .create_message(chat_message::ActiveModel {
                id: Set(self.id_gen.generate()),
                chat_id: Set(input.chat_id),
                author_id: Set(author_id.to_string()),
                content: Set(input.content),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// List messages of a room, newest first, paginated. The caller must
    /// be a member of the room.
    pub async fn messages(
        &self,
        caller_id: &str,
        chat_id: &str,
        page: Page,
    ) -> AppResult<Vec<chat_message::Model>> {
        self.require_member(caller_id, chat_id).await?;

        self.chat_repo
            .messages(chat_id, page.limit(), page.offset())
            .await
    }

    /// List members of a room, paginated. The caller must be a member of
    /// the room.
    pub async fn members(
        &self,
        caller_id: &str,
        chat_id: &str,
        page: Page,
    ) -> AppResult<Vec<user::Model>> {
        self.require_member(caller_id, chat_id).await?;

        self.chat_repo
            .members(chat_id, page.limit(), page.offset())
            .await
    }

    async fn require_member(&self, user_id: &str, chat_id: &str) -> AppResult<()> {
        if self.chat_repo.is_member(user_id, chat_id).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Not a member of chat '{chat_id}'"
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_send_message_requires_membership() {
        // Membership count comes back zero.
        let mut count = std::collections::BTreeMap::new();
        count.insert("num_items", sea_orm::Value::BigInt(Some(0)));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count]])
                .into_connection(),
        );
        let svc = ChatService::new(ChatRepository::new(db));

        let result = svc
            .send_message(
                "usr1",
                SendMessageInput {
                    chat_id: "chat1".to_string(),
                    content: "hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_messages_hidden_from_non_members() {
        let mut count = std::collections::BTreeMap::new();
        count.insert("num_items", sea_orm::Value::BigInt(Some(0)));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count]])
                .into_connection(),
        );
        let svc = ChatService::new(ChatRepository::new(db));

        let result = svc.messages("usr1", "chat1", Page::default()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_member_list_hidden_from_non_members() {
        let mut count = std::collections::BTreeMap::new();
        count.insert("num_items", sea_orm::Value::BigInt(Some(0)));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count]])
                .into_connection(),
        );
        let svc = ChatService::new(ChatRepository::new(db));

        let result = svc.members("usr1", "chat1", Page::default()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_send_message_rejects_empty_content() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = ChatService::new(ChatRepository::new(db));

        let result = svc
            .send_message(
                "usr1",
                SendMessageInput {
                    chat_id: "chat1".to_string(),
                    content: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
