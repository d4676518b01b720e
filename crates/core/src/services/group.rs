//! Group service.
//!
//! Groups own their chat room: the two are created together and the chat
//! room's cascade removes the group (and its admin/member/event rows) on
//! delete.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::Deserialize;
use validator::Validate;
use verdant_common::{AppError, AppResult, IdGenerator, Page};
use verdant_db::entities::{
    chat_member, chat_room, event, group, group_admin, group_member, user,
};
use verdant_db::repositories::{ChatRepository, GroupRepository};

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// Input for updating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    pub group_id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Service for managing groups.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    chat_repo: ChatRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository, chat_repo: ChatRepository) -> Self {
        Self {
            group_repo,
            chat_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a group by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// List groups created by a user.
    pub async fn list_created(&self, user_id: &str, page: Page) -> AppResult<Vec<group::Model>> {
        self.group_repo
            .find_created_by_user(user_id, page.limit(), page.offset())
            .await
    }

    /// Create a group.
    ///
    /// Creates the chat room and the group in one transaction and seeds
    /// the creator as both admin and member.
    pub async fn create(
        &self,
        creator_id: &str,
        input: CreateGroupInput,
    ) -> AppResult<group::Model> {
        input.validate()?;

        let now = Utc::now();
        let txn = self
            .group_repo
            .db()
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let chat = chat_room::ActiveModel {
            id: Set(self.id_gen.generate()),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let group = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            creator_id: Set(creator_id.to_string()),
            chat_id: Set(chat.id.clone()),
            picture: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        chat_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            chat_id: Set(chat.id),
            user_id: Set(creator_id.to_string()),
            joined_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        group_admin::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group.id.clone()),
            user_id: Set(creator_id.to_string()),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group.id.clone()),
            user_id: Set(creator_id.to_string()),
            joined_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(group_id = %group.id, creator_id = %creator_id, "Group created");

        Ok(group)
    }

    /// Update a group's name or picture. The actor must be an admin.
    pub async fn update(&self, actor_id: &str, input: UpdateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        let group = self.group_repo.get_by_id(&input.group_id).await?;

        if !self.group_repo.is_admin(actor_id, &input.group_id).await? {
            return Err(AppError::NotAGroupAdmin(input.group_id));
        }

        let mut active: group::ActiveModel = group.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(picture) = input.picture {
            active.picture = Set(Some(picture));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.group_repo.update(active).await
    }

    /// Delete a group. Only the creator may do this.
    pub async fn delete(&self, actor_id: &str, group_id: &str) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;

        if group.creator_id != actor_id {
            return Err(AppError::NotTheGroupCreator(group_id.to_string()));
        }

        // Deleting the chat room cascades the group and its join rows.
        self.chat_repo.delete_room(&group.chat_id).await?;

        tracing::info!(group_id = %group_id, "Group deleted");

        Ok(())
    }

    // ==================== Association Accessors ====================

    /// The user who created the group.
    pub async fn creator(&self, group: &group::Model) -> AppResult<user::Model> {
        self.group_repo.creator(group).await
    }

    /// The chat room owned by the group.
    pub async fn chat(&self, group: &group::Model) -> AppResult<chat_room::Model> {
        self.group_repo.chat(group).await
    }

    /// The admins of the group, paginated.
    pub async fn admins(&self, group_id: &str, page: Page) -> AppResult<Vec<user::Model>> {
        self.group_repo
            .admins(group_id, page.limit(), page.offset())
            .await
    }

    /// The members of the group, paginated.
    pub async fn members(&self, group_id: &str, page: Page) -> AppResult<Vec<user::Model>> {
        self.group_repo
            .members(group_id, page.limit(), page.offset())
            .await
    }

    /// The events of the group, paginated.
    pub async fn events(&self, group_id: &str, page: Page) -> AppResult<Vec<event::Model>> {
        self.group_repo
            .events(group_id, page.limit(), page.offset())
            .await
    }

    // ==================== Membership & Admin Rights ====================

    /// Join a group.
    pub async fn join(&self, user_id: &str, group_id: &str) -> AppResult<group_member::Model> {
        self.group_repo.get_by_id(group_id).await?;

        if self.group_repo.is_member(user_id, group_id).await? {
            return Err(AppError::Conflict(format!(
                "Already a member of group '{group_id}'"
            )));
        }

        let member = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id.to_string()),
            user_id: Set(user_id.to_string()),
            joined_at: Set(Utc::now().into()),
        };

        self.group_repo.add_member(member).await
    }

    /// Leave a group. The creator cannot leave their own group.
    pub async fn leave(&self, user_id: &str, group_id: &str) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;

        if group.creator_id == user_id {
            return Err(AppError::Forbidden(
                "The creator cannot leave their own group".to_string(),
            ));
        }

        // Admin rights do not survive leaving.
        self.group_repo.remove_admin(user_id, group_id).await?;

        let removed = self.group_repo.remove_member(user_id, group_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound(format!(
                "Not a member of group '{group_id}'"
            )));
        }

        Ok(())
    }

    /// Grant admin rights to a member. The actor must be an admin.
    pub async fn add_admin(
        &self,
        actor_id: &str,
        group_id: &str,
        user_id: &str,
    ) -> AppResult<group_admin::Model> {
        self.group_repo.get_by_id(group_id).await?;

        if !self.group_repo.is_admin(actor_id, group_id).await? {
            return Err(AppError::NotAGroupAdmin(group_id.to_string()));
        }

        if !self.group_repo.is_member(user_id, group_id).await? {
            return Err(AppError::BadRequest(format!(
                "User '{user_id}' is not a member of group '{group_id}'"
            )));
        }

        if self.group_repo.is_admin(user_id, group_id).await? {
            return Err(AppError::Conflict(format!(
                "User '{user_id}' is already an admin of group '{group_id}'"
            )));
        }

        let admin = group_admin::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.group_repo.add_admin(admin).await
    }

    /// Revoke admin rights. The actor must be an admin; the creator's
    /// admin rights cannot be revoked.
    pub async fn remove_admin(
        &self,
        actor_id: &str,
        group_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;

        if !self.group_repo.is_admin(actor_id, group_id).await? {
            return Err(AppError::NotAGroupAdmin(group_id.to_string()));
        }

        if group.creator_id == user_id {
            return Err(AppError::Forbidden(
                "The creator's admin rights cannot be revoked".to_string(),
            ));
        }

        let removed = self.group_repo.remove_admin(user_id, group_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound(format!(
                "User '{user_id}' is not an admin of group '{group_id}'"
            )));
        }

        Ok(())
    }

    /// Check admin rights, raising the domain error if missing.
    pub async fn require_admin(&self, user_id: &str, group_id: &str) -> AppResult<()> {
        if self.group_repo.is_admin(user_id, group_id).await? {
            Ok(())
        } else {
            Err(AppError::NotAGroupAdmin(group_id.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    fn create_test_group(id: &str, creator_id: &str, chat_id: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            name: "Hiking Club".to_string(),
            creator_id: creator_id.to_string(),
            chat_id: chat_id.to_string(),
            picture: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: DatabaseConnection) -> GroupService {
        let db = Arc::new(db);
        GroupService::new(
            GroupRepository::new(db.clone()),
            ChatRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let svc = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc
            .create(
                "usr1",
                CreateGroupInput {
                    name: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_creator_is_rejected() {
        let group = create_test_group("grp1", "usr1", "chat1");

        let svc = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group]])
                .into_connection(),
        );

        let result = svc.delete("usr2", "grp1").await;

        assert!(matches!(result, Err(AppError::NotTheGroupCreator(id)) if id == "grp1"));
    }

    #[tokio::test]
    async fn test_require_admin_raises_domain_error() {
        // Count query returns zero rows for the admin check.
        let svc = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit_count(0)]])
                .into_connection(),
        );

        let result = svc.require_admin("usr2", "grp1").await;

        match result {
            Err(AppError::NotAGroupAdmin(id)) => {
                assert_eq!(id, "grp1");
                assert!(
                    AppError::NotAGroupAdmin(id)
                        .to_string()
                        .contains("grp1")
                );
            }
            other => panic!("expected NotAGroupAdmin, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_twice_is_a_conflict() {
        let group = create_test_group("grp1", "usr1", "chat1");

        // Group lookup succeeds, then the membership count finds a row.
        let svc = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group]])
                .append_query_results([[maplit_count(1)]])
                .into_connection(),
        );

        let result = svc.join("usr2", "grp1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    // MockDatabase represents COUNT results as maps.
    fn maplit_count(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut map = std::collections::BTreeMap::new();
        map.insert("num_items", sea_orm::Value::BigInt(Some(n)));
        map
    }
}
