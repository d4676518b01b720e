//! Chat repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use verdant_common::{AppError, AppResult};

use crate::entities::{
    chat_member, chat_message, chat_room, user, ChatMember, ChatMessage, ChatRoom, User,
};

/// Repository for chat room and message operations.
#[derive(Clone)]
pub struct ChatRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatRepository {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Room Operations ====================

    /// Find chat room by ID.
    pub async fn find_room(&self, id: &str) -> AppResult<Option<chat_room::Model>> {
        ChatRoom::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get chat room by ID, returning error if not found.
    pub async fn get_room(&self, id: &str) -> AppResult<chat_room::Model> {
        self.find_room(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chat room not found: {id}")))
    }

    /// Create a chat room.
    pub async fn create_room(&self, model: chat_room::ActiveModel) -> AppResult<chat_room::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a chat room (members and messages cascade).
    pub async fn delete_room(&self, id: &str) -> AppResult<()> {
        ChatRoom::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ==================== Member Operations ====================

    /// Check if user is a member of a chat room.
    pub async fn is_member(&self, user_id: &str, chat_id: &str) -> AppResult<bool> {
        let count = ChatMember::find()
            .filter(chat_member::Column::UserId.eq(user_id))
            .filter(chat_member::Column::ChatId.eq(chat_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Add a member to a chat room.
    pub async fn add_member(
        &self,
        model: chat_member::ActiveModel,
    ) -> AppResult<chat_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the members of a chat room, paginated.
    pub async fn members(
        &self,
        chat_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let links = ChatMember::find()
            .filter(chat_member::Column::ChatId.eq(chat_id))
            .order_by(chat_member::Column::JoinedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user_ids: Vec<String> = links.iter().map(|l| l.user_id.clone()).collect();
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Message Operations ====================

    /// Store a message.
    pub async fn create_message(
        &self,
        model: chat_message::ActiveModel,
    ) -> AppResult<chat_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List messages of a chat room, newest first, paginated.
    pub async fn messages(
        &self,
        chat_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<chat_message::Model>> {
        ChatMessage::find()
            .filter(chat_message::Column::ChatId.eq(chat_id))
            .order_by(chat_message::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_message(id: &str, chat_id: &str, content: &str) -> chat_message::Model {
        chat_message::Model {
            id: id.to_string(),
            chat_id: chat_id.to_string(),
            author_id: "usr1".to_string(),
            content: content.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_messages_newest_first() {
        let messages = vec![
            create_test_message("msg2", "chat1", "second"),
            create_test_message("msg1", "chat1", "first"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([messages])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let result = repo.messages("chat1", 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "second");
    }

    #[tokio::test]
    async fn test_get_room_missing_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<chat_room::Model>::new()])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let result = repo.get_room("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
