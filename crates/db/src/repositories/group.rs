//! Group repository.
//!
//! Association accessors (`creator`, `chat`, `admins`, `members`, `events`)
//! return the referenced entities, never the join rows.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use verdant_common::{AppError, AppResult};

use crate::entities::{
    chat_room, event, group, group_admin, group_member, user, ChatRoom, Event, Group, GroupAdmin,
    GroupMember, User,
};

/// Repository for group operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get reference to the database connection.
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    // ==================== Group Operations ====================

    /// Find group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get group by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::GroupNotFound(id.to_string()))
    }

    /// Update a group.
    pub async fn update(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find groups created by a user.
    pub async fn find_created_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group::Model>> {
        Group::find()
            .filter(group::Column::CreatorId.eq(user_id))
            .order_by(group::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Association Accessors ====================

    /// Get the creator of a group.
    ///
    /// Every group has exactly one creator; a missing row means the
    /// database violated its own foreign key.
    pub async fn creator(&self, group: &group::Model) -> AppResult<user::Model> {
        User::find_by_id(&group.creator_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::UserNotFound(group.creator_id.clone()))
    }

    /// Get the chat room of a group.
    pub async fn chat(&self, group: &group::Model) -> AppResult<chat_room::Model> {
        ChatRoom::find_by_id(&group.chat_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Chat room not found: {}", group.chat_id)))
    }

    /// List the admins of a group, paginated.
    pub async fn admins(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let links = GroupAdmin::find()
            .filter(group_admin::Column::GroupId.eq(group_id))
            .order_by(group_admin::Column::CreatedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.users_for_links(links.iter().map(|l| l.user_id.clone()).collect())
            .await
    }

    /// List the members of a group, paginated.
    pub async fn members(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let links = GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .order_by(group_member::Column::JoinedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.users_for_links(links.iter().map(|l| l.user_id.clone()).collect())
            .await
    }

    /// List the events of a group, paginated.
    pub async fn events(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(event::Column::GroupId.eq(group_id))
            .order_by(event::Column::DueDate, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Resolve join rows to user entities, preserving the link order.
    async fn users_for_links(&self, user_ids: Vec<String>) -> AppResult<Vec<user::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(user_ids.clone()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // `is_in` does not preserve input order; restore it.
        let mut by_id: std::collections::HashMap<String, user::Model> =
            users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Ok(user_ids.into_iter().filter_map(|id| by_id.remove(&id)).collect())
    }

    // ==================== Admin Operations ====================

    /// Check if user is an admin of a group.
    pub async fn is_admin(&self, user_id: &str, group_id: &str) -> AppResult<bool> {
        let count = GroupAdmin::find()
            .filter(group_admin::Column::UserId.eq(user_id))
            .filter(group_admin::Column::GroupId.eq(group_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Grant a user admin rights in a group.
    pub async fn add_admin(&self, model: group_admin::ActiveModel) -> AppResult<group_admin::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Revoke a user's admin rights in a group.
    pub async fn remove_admin(&self, user_id: &str, group_id: &str) -> AppResult<u64> {
        let deleted = GroupAdmin::delete_many()
            .filter(group_admin::Column::UserId.eq(user_id))
            .filter(group_admin::Column::GroupId.eq(group_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted.rows_affected)
    }

    // ==================== Member Operations ====================

    /// Check if user is a member of a group.
    pub async fn is_member(&self, user_id: &str, group_id: &str) -> AppResult<bool> {
        let count = GroupMember::find()
            .filter(group_member::Column::UserId.eq(user_id))
            .filter(group_member::Column::GroupId.eq(group_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Add a member to a group.
    pub async fn add_member(
        &self,
        model: group_member::ActiveModel,
    ) -> AppResult<group_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a member from a group.
    pub async fn remove_member(&self, user_id: &str, group_id: &str) -> AppResult<u64> {
        let deleted = GroupMember::delete_many()
            .filter(group_member::Column::UserId.eq(user_id))
            .filter(group_member::Column::GroupId.eq(group_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_group(id: &str, creator_id: &str, chat_id: &str, name: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            name: name.to_string(),
            creator_id: creator_id.to_string(),
            chat_id: chat_id.to_string(),
            picture: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            display_name: None,
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$stub".to_string(),
            token: None,
            token_issued_at: None,
            profile_picture: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_admin(id: &str, group_id: &str, user_id: &str) -> group_admin::Model {
        group_admin::Model {
            id: id.to_string(),
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let group = create_test_group("grp1", "usr1", "chat1", "Hiking Club");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group.clone()]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.find_by_id("grp1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Hiking Club");
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_group_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_creator_returns_the_referenced_user() {
        let group = create_test_group("grp1", "usr1", "chat1", "Hiking Club");
        let creator = create_test_user("usr1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[creator.clone()]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.creator(&group).await.unwrap();

        assert_eq!(result.id, group.creator_id);
    }

    #[tokio::test]
    async fn test_admins_resolves_users_not_join_rows() {
        let admin_links = vec![
            create_test_admin("ga1", "grp1", "usr1"),
            create_test_admin("ga2", "grp1", "usr2"),
        ];
        let users = vec![
            create_test_user("usr1", "alice"),
            create_test_user("usr2", "bob"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([admin_links])
                .append_query_results([users])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.admins("grp1", 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].username, "alice");
        assert_eq!(result[1].username, "bob");
    }

    #[tokio::test]
    async fn test_admins_applies_limit_and_offset() {
        let admin_links = vec![create_test_admin("ga3", "grp1", "usr3")];
        let users = vec![create_test_user("usr3", "carol")];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([admin_links])
                .append_query_results([users])
                .into_connection(),
        );

        let repo = GroupRepository::new(Arc::clone(&db));
        repo.admins("grp1", 3, 2).await.unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db)
            .map_err(|_| "connection still shared")
            .unwrap()
            .into_transaction_log();
        let link_query = format!("{:?}", log[0]);
        assert!(link_query.contains("LIMIT"), "no LIMIT in: {link_query}");
        assert!(link_query.contains("OFFSET"), "no OFFSET in: {link_query}");
        assert!(link_query.contains("Some(3)"), "limit not bound in: {link_query}");
        assert!(link_query.contains("Some(2)"), "offset not bound in: {link_query}");
    }

    #[tokio::test]
    async fn test_admins_empty_group_skips_user_query() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_admin::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.admins("grp1", 10, 0).await.unwrap();

        assert!(result.is_empty());
    }
}
