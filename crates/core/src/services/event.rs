//! Event service.

use chrono::Utc;
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use validator::Validate;
use verdant_common::{AppError, AppResult, IdGenerator, Page};
use verdant_db::entities::{event, event_participant, user};
use verdant_db::repositories::{EventRepository, GroupRepository};

/// Input for creating an event within a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub group_id: String,
    pub due_date: DateTimeWithTimeZone,
}

/// Service for managing group events.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub fn new(event_repo: EventRepository, group_repo: GroupRepository) -> Self {
        Self {
            event_repo,
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get an event by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.event_repo.get_by_id(id).await
    }

    /// Create an event. Only group admins may schedule events.
    pub async fn create(&self, actor_id: &str, input: CreateEventInput) -> AppResult<event::Model> {
        input.validate()?;

        self.group_repo.get_by_id(&input.group_id).await?;

        if !self.group_repo.is_admin(actor_id, &input.group_id).await? {
            return Err(AppError::NotAGroupAdmin(input.group_id));
        }

        let model = event::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            group_id: Set(input.group_id),
            due_date: Set(input.due_date),
            created_at: Set(Utc::now().into()),
        };

        let created = self.event_repo.create(model).await?;

        tracing::info!(
            event_id = %created.id,
            group_id = %created.group_id,
            "Event created"
        );

        Ok(created)
    }

    /// Delete an event. Only admins of the owning group may do this.
    pub async fn delete(&self, actor_id: &str, event_id: &str) -> AppResult<()> {
        let event = self.event_repo.get_by_id(event_id).await?;

        if !self.group_repo.is_admin(actor_id, &event.group_id).await? {
            return Err(AppError::NotAGroupAdmin(event.group_id));
        }

        self.event_repo.delete(event_id).await
    }

    /// Join an event. The user must be a member of the owning group.
    pub async fn join(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> AppResult<event_participant::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;

        if !self.group_repo.is_member(user_id, &event.group_id).await? {
            return Err(AppError::Forbidden(
                "Only group members can join the event".to_string(),
            ));
        }

        if self.event_repo.is_participant(user_id, event_id).await? {
            return Err(AppError::Conflict(
                "Already participating in this event".to_string(),
            ));
        }

        let model = event_participant::ActiveModel {
            id: Set(self.id_gen.generate()),
            event_id: Set(event_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.event_repo.add_participant(model).await
    }

    /// Leave an event.
    pub async fn leave(&self, user_id: &str, event_id: &str) -> AppResult<()> {
        let removed = self.event_repo.remove_participant(user_id, event_id).await?;

        if removed == 0 {
            return Err(AppError::NotFound(
                "Not a participant of this event".to_string(),
            ));
        }

        Ok(())
    }

    /// List the participants of an event, paginated.
    pub async fn participants(&self, event_id: &str, page: Page) -> AppResult<Vec<user::Model>> {
        self.event_repo
            .participants(event_id, page.limit(), page.offset())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use verdant_db::entities::group;

    fn create_test_group(id: &str, creator_id: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            name: "Hiking Club".to_string(),
            creator_id: creator_id.to_string(),
            chat_id: "chat1".to_string(),
            picture: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_event(id: &str, group_id: &str) -> event::Model {
        event::Model {
            id: id.to_string(),
            name: "Summit Hike".to_string(),
            group_id: group_id.to_string(),
            due_date: Utc::now().into(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: DatabaseConnection) -> EventService {
        let db = Arc::new(db);
        EventService::new(EventRepository::new(db.clone()), GroupRepository::new(db))
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut map = std::collections::BTreeMap::new();
        map.insert("num_items", sea_orm::Value::BigInt(Some(n)));
        map
    }

    #[tokio::test]
    async fn test_create_by_non_admin_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_group("grp1", "usr1")]])
            .append_query_results([[count_row(0)]])
            .into_connection();

        let result = service_with(db)
            .create(
                "usr2",
                CreateEventInput {
                    name: "Summit Hike".to_string(),
                    group_id: "grp1".to_string(),
                    due_date: Utc::now().into(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotAGroupAdmin(id)) if id == "grp1"));
    }

    #[tokio::test]
    async fn test_join_requires_group_membership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_event("evt1", "grp1")]])
            .append_query_results([[count_row(0)]])
            .into_connection();

        let result = service_with(db).join("usr2", "evt1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
